//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading and logging initialization so command
//! handlers start from the same state.

use tracing::info;

use mapstitch::config::ConfigFile;
use mapstitch::logging::{init_logging, ConsoleOutput, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the log writer alive while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads the config file (defaults if absent) and starts logging.
    ///
    /// Warnings and errors are mirrored to stderr; everything else goes to
    /// the configured log file only.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let level = if verbose { "debug" } else { "info" };

        let logging_guard = init_logging(&config.logging.file, ConsoleOutput::Stderr, level)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("mapstitch v{}", mapstitch::VERSION);
        info!("mapstitch CLI: {} command", command);
    }
}
