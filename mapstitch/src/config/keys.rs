//! Configuration key access and validation.
//!
//! Provides a type-safe interface for getting and setting configuration
//! values by `section.key` name, as used by `mapstitch config get|set`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::file::ConfigFile;
use crate::coord::MAX_PRECISION;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Provider settings
    ProviderUrlTemplate,
    ProviderApiKey,
    ProviderTimeout,
    ProviderMaxRetries,

    // Build settings
    BuildPrecision,
    BuildMaxDimension,
    BuildParallelFetches,

    // Cache settings
    CacheDirectory,
    CacheKeepTiles,

    // Output settings
    OutputDirectory,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "provider.url_template" => Ok(ConfigKey::ProviderUrlTemplate),
            "provider.api_key" => Ok(ConfigKey::ProviderApiKey),
            "provider.timeout" => Ok(ConfigKey::ProviderTimeout),
            "provider.max_retries" => Ok(ConfigKey::ProviderMaxRetries),

            "build.precision" => Ok(ConfigKey::BuildPrecision),
            "build.max_dimension" => Ok(ConfigKey::BuildMaxDimension),
            "build.parallel_fetches" => Ok(ConfigKey::BuildParallelFetches),

            "cache.directory" => Ok(ConfigKey::CacheDirectory),
            "cache.keep_tiles" => Ok(ConfigKey::CacheKeepTiles),

            "output.directory" => Ok(ConfigKey::OutputDirectory),

            "logging.file" => Ok(ConfigKey::LoggingFile),

            _ => Err(ConfigKeyError::UnknownKey(s.to_string())),
        }
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "build.precision").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ProviderUrlTemplate => "provider.url_template",
            ConfigKey::ProviderApiKey => "provider.api_key",
            ConfigKey::ProviderTimeout => "provider.timeout",
            ConfigKey::ProviderMaxRetries => "provider.max_retries",
            ConfigKey::BuildPrecision => "build.precision",
            ConfigKey::BuildMaxDimension => "build.max_dimension",
            ConfigKey::BuildParallelFetches => "build.parallel_fetches",
            ConfigKey::CacheDirectory => "cache.directory",
            ConfigKey::CacheKeepTiles => "cache.keep_tiles",
            ConfigKey::OutputDirectory => "output.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "build").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "precision").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ProviderUrlTemplate => config.provider.url_template.clone(),
            ConfigKey::ProviderApiKey => config.provider.api_key.clone().unwrap_or_default(),
            ConfigKey::ProviderTimeout => config.provider.timeout.to_string(),
            ConfigKey::ProviderMaxRetries => config.provider.max_retries.to_string(),
            ConfigKey::BuildPrecision => config.build.precision.to_string(),
            ConfigKey::BuildMaxDimension => config.build.max_dimension.to_string(),
            ConfigKey::BuildParallelFetches => config.build.parallel_fetches.to_string(),
            ConfigKey::CacheDirectory => path_to_display(&config.cache.directory),
            ConfigKey::CacheKeepTiles => config.cache.keep_tiles.to_string(),
            ConfigKey::OutputDirectory => path_to_display(&config.output.directory),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        match self {
            ConfigKey::ProviderUrlTemplate => {
                config.provider.url_template = value.trim().to_string();
            }
            ConfigKey::ProviderApiKey => {
                config.provider.api_key = optional_string(value);
            }
            ConfigKey::ProviderTimeout => {
                config.provider.timeout = self.parse_number(value)?;
            }
            ConfigKey::ProviderMaxRetries => {
                config.provider.max_retries = self.parse_number(value)?;
            }
            ConfigKey::BuildPrecision => {
                config.build.precision = self.parse_number(value)?;
            }
            ConfigKey::BuildMaxDimension => {
                config.build.max_dimension = self.parse_number(value)?;
            }
            ConfigKey::BuildParallelFetches => {
                config.build.parallel_fetches = self.parse_number(value)?;
            }
            ConfigKey::CacheDirectory => {
                config.cache.directory = expand_tilde(value.trim());
            }
            ConfigKey::CacheKeepTiles => {
                config.cache.keep_tiles = parse_bool(value).unwrap_or(false);
            }
            ConfigKey::OutputDirectory => {
                config.output.directory = expand_tilde(value.trim());
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value.trim());
            }
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .map_err(|reason| self.invalid(reason))
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ProviderUrlTemplate,
            ConfigKey::ProviderApiKey,
            ConfigKey::ProviderTimeout,
            ConfigKey::ProviderMaxRetries,
            ConfigKey::BuildPrecision,
            ConfigKey::BuildMaxDimension,
            ConfigKey::BuildParallelFetches,
            ConfigKey::CacheDirectory,
            ConfigKey::CacheKeepTiles,
            ConfigKey::OutputDirectory,
            ConfigKey::LoggingFile,
        ]
    }

    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ProviderUrlTemplate => Box::new(UrlSpec),
            ConfigKey::ProviderApiKey => Box::new(AnyStringSpec),
            ConfigKey::ProviderTimeout => Box::new(RangeSpec { min: 1, max: 3600 }),
            ConfigKey::ProviderMaxRetries => Box::new(RangeSpec { min: 0, max: 10 }),
            ConfigKey::BuildPrecision => Box::new(RangeSpec {
                min: 0,
                max: MAX_PRECISION as u64,
            }),
            ConfigKey::BuildMaxDimension => Box::new(RangeSpec {
                min: 1,
                max: u32::MAX as u64,
            }),
            ConfigKey::BuildParallelFetches => Box::new(RangeSpec { min: 1, max: 64 }),
            ConfigKey::CacheDirectory => Box::new(PathSpec),
            ConfigKey::CacheKeepTiles => Box::new(BooleanSpec),
            ConfigKey::OutputDirectory => Box::new(PathSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    fn parse_number<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value
            .trim()
            .parse()
            .map_err(|_| self.invalid("must be a non-negative integer".to_string()))
    }

    fn invalid(&self, reason: String) -> ConfigKeyError {
        ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason,
        }
    }
}

// ============================================================================
// Value Specifications
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Accepts any string value.
struct AnyStringSpec;

impl ValueSpecification for AnyStringSpec {
    fn is_satisfied_by(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Integer within an inclusive range.
struct RangeSpec {
    min: u64,
    max: u64,
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.trim().parse::<u64>() {
            Ok(n) if n >= self.min && n <= self.max => Ok(()),
            _ => Err(format!(
                "must be an integer between {} and {}",
                self.min, self.max
            )),
        }
    }
}

/// Boolean values.
struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_bool(value)
            .map(|_| ())
            .ok_or_else(|| "must be true/false, yes/no, 1/0, or on/off".to_string())
    }
}

/// Non-empty path values.
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// HTTP(S) URL values.
struct UrlSpec;

impl ValueSpecification for UrlSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(())
        } else {
            Err("must be a URL starting with 'http://' or 'https://'".to_string())
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Convert path to display string, collapsing home dir to ~.
pub(super) fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Parses the boolean spellings accepted in config.ini.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Convert empty string to None, non-empty to Some.
fn optional_string(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
