//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use mapstitch::cache::CacheError;
use mapstitch::config::ConfigFileError;
use mapstitch::coord::CoordError;
use mapstitch::provider::ProviderError;
use mapstitch::BuildError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create the HTTP client
    ProviderCreation(ProviderError),
    /// The build failed
    Build(BuildError),
    /// Invalid coordinates passed to `locate`
    Locate(CoordError),
    /// Tile cache could not be read or cleared
    Cache(CacheError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Build(BuildError::Fetch { source, .. }) => {
                eprintln!();
                if source.is_retryable() {
                    eprintln!("The tile source may be temporarily unavailable.");
                    eprintln!("Try again, or raise retries with --retries.");
                } else {
                    eprintln!("If using the Google Maps Static API, make sure:");
                    eprintln!("  1. Maps Static API is enabled in Google Cloud Console");
                    eprintln!("  2. Billing is enabled for your project");
                    eprintln!("  3. Your API key is valid (--api-key or $GMAP_KEY)");
                }
            }
            CliError::Build(BuildError::DimensionTooLarge { max, .. }) => {
                eprintln!();
                eprintln!(
                    "Raise the limit with 'mapstitch config set build.max_dimension <px>' \
                     (current: {}).",
                    max
                );
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ProviderCreation(e) => write!(f, "Failed to create provider: {}", e),
            CliError::Build(e) => write!(f, "Build failed: {}", e),
            CliError::Locate(e) => write!(f, "Invalid location: {}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ProviderCreation(e) => Some(e),
            CliError::Build(e) => Some(e),
            CliError::Locate(e) => Some(e),
            CliError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<BuildError> for CliError {
    fn from(e: BuildError) -> Self {
        CliError::Build(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = CliError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad value");

        let err = CliError::Build(BuildError::Cancelled);
        assert_eq!(err.to_string(), "Build failed: Build cancelled");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err = CliError::Locate(CoordError::InvalidZoom(25));
        assert!(err.source().is_some());
        assert!(CliError::LoggingInit("x".into()).source().is_none());
    }
}
