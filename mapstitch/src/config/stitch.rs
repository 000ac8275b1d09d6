//! Runtime configuration for a build.

use std::path::PathBuf;
use std::time::Duration;

use crate::coord::DEFAULT_PRECISION;

/// Largest width or height accepted for one stitched image.
pub const DEFAULT_MAX_DIMENSION: u32 = 3000;

/// Default number of concurrent tile fetches.
pub const DEFAULT_PARALLEL_FETCHES: usize = 4;

/// Default per-fetch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retry count for transient fetch failures.
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Default tile cache directory, relative to the working directory.
pub const DEFAULT_TEMP_DIR: &str = "tmp";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Settings that shape a build.
///
/// Constructed once by the caller and handed to the orchestrator; nothing
/// in the library reads configuration from global state.
///
/// # Example
///
/// ```
/// use mapstitch::config::StitchConfig;
///
/// let config = StitchConfig::default()
///     .with_parallel_fetches(8)
///     .with_max_dimension(2000);
/// assert_eq!(config.parallel_fetches, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StitchConfig {
    /// Decimal places coordinates are rounded to
    pub precision: u32,
    /// Largest accepted width or height in pixels
    pub max_dimension: u32,
    /// Concurrent fetches; 1 fetches sequentially
    pub parallel_fetches: usize,
    /// Per-fetch HTTP timeout
    pub timeout: Duration,
    /// Retries for transient fetch failures
    pub max_retries: u32,
    /// Tile cache directory
    pub temp_dir: PathBuf,
    /// Directory for saved images
    pub output_dir: PathBuf,
    /// Keep cached tiles after a build
    pub keep_tiles: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            max_dimension: DEFAULT_MAX_DIMENSION,
            parallel_fetches: DEFAULT_PARALLEL_FETCHES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            keep_tiles: false,
        }
    }
}

impl StitchConfig {
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Sets the fetch concurrency. Values below 1 are raised to 1.
    pub fn with_parallel_fetches(mut self, parallel_fetches: usize) -> Self {
        self.parallel_fetches = parallel_fetches.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_keep_tiles(mut self, keep_tiles: bool) -> Self {
        self.keep_tiles = keep_tiles;
        self
    }
}
