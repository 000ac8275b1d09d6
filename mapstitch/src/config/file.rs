//! Configuration file handling for ~/.mapstitch/config.ini.
//!
//! Loads and saves user configuration with sensible defaults. Parsing lives
//! in [`super::parser`] and serialization in [`super::writer`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::stitch::{
    StitchConfig, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_DIR,
    DEFAULT_PARALLEL_FETCHES, DEFAULT_TEMP_DIR, DEFAULT_TIMEOUT_SECS,
};
use crate::coord::DEFAULT_PRECISION;
use crate::provider::DEFAULT_URL_TEMPLATE;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "GMAP_KEY";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// Complete user configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub provider: ProviderSettings,
    pub build: BuildSettings,
    pub cache: CacheSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Static map URL template
    pub url_template: String,
    /// API key substituted for `{api_key}`
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout: u64,
    /// Retries for transient failures
    pub max_retries: u32,
}

/// `[build]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    pub precision: u32,
    pub max_dimension: u32,
    pub parallel_fetches: usize,
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Tile cache directory
    pub directory: PathBuf,
    /// Keep tiles after they have been stitched
    pub keep_tiles: bool,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub directory: PathBuf,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            provider: ProviderSettings {
                url_template: DEFAULT_URL_TEMPLATE.to_string(),
                api_key: None,
                timeout: DEFAULT_TIMEOUT_SECS,
                max_retries: DEFAULT_MAX_RETRIES,
            },
            build: BuildSettings {
                precision: DEFAULT_PRECISION,
                max_dimension: DEFAULT_MAX_DIMENSION,
                parallel_fetches: DEFAULT_PARALLEL_FETCHES,
            },
            cache: CacheSettings {
                directory: PathBuf::from(DEFAULT_TEMP_DIR),
                keep_tiles: false,
            },
            output: OutputSettings {
                directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.mapstitch/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.mapstitch/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Returns the configured API key, falling back to `$GMAP_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.provider
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Builds the runtime configuration for the orchestrator.
    pub fn to_stitch_config(&self) -> StitchConfig {
        StitchConfig::default()
            .with_precision(self.build.precision)
            .with_max_dimension(self.build.max_dimension)
            .with_parallel_fetches(self.build.parallel_fetches)
            .with_timeout(Duration::from_secs(self.provider.timeout))
            .with_max_retries(self.provider.max_retries)
            .with_temp_dir(self.cache.directory.clone())
            .with_output_dir(self.output.directory.clone())
            .with_keep_tiles(self.cache.keep_tiles)
    }
}

/// Get the path to the config directory (~/.mapstitch).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapstitch")
}

/// Get the path to the config file (~/.mapstitch/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default log file (~/.mapstitch/mapstitch.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("mapstitch.log")
}
