//! Configuration for mapstitch.
//!
//! [`StitchConfig`] carries the settings a build runs with. [`ConfigFile`]
//! is the user's `~/.mapstitch/config.ini`, read and written with rust-ini,
//! and converts into a [`StitchConfig`].
//!
//! # Example
//!
//! ```
//! use mapstitch::config::ConfigFile;
//!
//! let config = ConfigFile::default().to_stitch_config();
//! assert_eq!(config.max_dimension, 3000);
//! ```

mod file;
mod keys;
mod parser;
mod stitch;
mod writer;

pub use file::{
    config_directory, config_file_path, default_log_file, BuildSettings, CacheSettings,
    ConfigFile, ConfigFileError, LoggingSettings, OutputSettings, ProviderSettings, API_KEY_ENV,
};
pub use keys::{ConfigKey, ConfigKeyError};
pub use stitch::{
    StitchConfig, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_DIR,
    DEFAULT_PARALLEL_FETCHES, DEFAULT_TEMP_DIR, DEFAULT_TIMEOUT_SECS,
};
