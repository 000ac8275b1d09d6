//! Logging infrastructure for mapstitch.
//!
//! Provides structured logging to a file and, optionally, the console:
//! - Writes to the configured log file (cleared on session start)
//! - Local-time timestamps
//! - Configurable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_file: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Where console output goes alongside the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutput {
    /// File only
    None,
    /// Mirror warnings and errors to stderr
    Stderr,
    /// Mirror everything that passes the filter to stdout
    Stdout,
}

/// Initialize logging.
///
/// Creates the log directory if needed, clears the previous log file and
/// installs the global subscriber. `default_level` applies when RUST_LOG
/// is unset.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(
    log_file: &Path,
    console: ConsoleOutput,
    default_level: &str,
) -> Result<LoggingGuard, io::Error> {
    let (log_dir, file_name) = split_log_path(log_file)?;
    fs::create_dir_all(&log_dir)?;
    fs::write(log_file, "")?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_timer(local_timer())
        .with_target(true);

    let console_layer = match console {
        ConsoleOutput::None => None,
        ConsoleOutput::Stderr => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_timer(local_timer())
                .compact()
                .with_filter(tracing_subscriber::filter::LevelFilter::WARN)
                .boxed(),
        ),
        ConsoleOutput::Stdout => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_timer(local_timer())
                .compact()
                .boxed(),
        ),
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_file: log_file.to_path_buf(),
    })
}

/// Timestamps in the local offset, falling back to UTC when it cannot be determined.
fn local_timer() -> OffsetTime<&'static [time::format_description::FormatItem<'static>]> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    )
}

/// Splits a log file path into its directory and file name.
fn split_log_path(log_file: &Path) -> Result<(PathBuf, String), io::Error> {
    let file_name = log_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path has no file name: {}", log_file.display()),
            )
        })?
        .to_string();
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}
