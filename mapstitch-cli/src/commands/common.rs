//! Common types and utilities shared across CLI commands.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use mapstitch::cache::TileCache;
use mapstitch::config::{ConfigFile, StitchConfig, API_KEY_ENV};
use mapstitch::provider::{ReqwestClient, RetryingProvider, StaticMapsProvider};
use mapstitch::{MapType, TileFetcher};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Map style selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum MapTypeArg {
    /// Street map
    Roadmap,
    /// Aerial imagery
    Satellite,
    /// Relief with roads
    Terrain,
    /// Aerial imagery with road and label overlay
    Hybrid,
}

impl From<MapTypeArg> for MapType {
    fn from(arg: MapTypeArg) -> Self {
        match arg {
            MapTypeArg::Roadmap => MapType::Roadmap,
            MapTypeArg::Satellite => MapType::Satellite,
            MapTypeArg::Terrain => MapType::Terrain,
            MapTypeArg::Hybrid => MapType::Hybrid,
        }
    }
}

/// Build settings taken from the command line, layered over the config file.
#[derive(Debug, Default, Clone)]
pub struct BuildOverrides {
    pub parallel: Option<usize>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub keep_tiles: bool,
}

impl BuildOverrides {
    pub fn apply(self, mut config: StitchConfig) -> StitchConfig {
        if let Some(parallel) = self.parallel {
            config = config.with_parallel_fetches(parallel);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(retries) = self.retries {
            config = config.with_max_retries(retries);
        }
        if self.keep_tiles {
            config = config.with_keep_tiles(true);
        }
        config
    }
}

/// Resolve the API key: CLI takes precedence, then config, then environment.
pub fn resolve_api_key(
    cli_api_key: Option<String>,
    config: &ConfigFile,
) -> Result<String, CliError> {
    cli_api_key.or_else(|| config.api_key()).ok_or_else(|| {
        CliError::Config(format!(
            "No API key configured. Set provider.api_key in config.ini, \
             export {} or use --api-key",
            API_KEY_ENV
        ))
    })
}

/// Builds the fetcher a build runs with: HTTP client, static maps provider,
/// retry decorator and tile cache.
///
/// Fetch behavior comes from `stitch`; only the provider endpoint and the
/// API key are read from the config file.
pub fn create_fetcher(
    config: &ConfigFile,
    stitch: &StitchConfig,
    cli_api_key: Option<String>,
    cancel: &CancellationToken,
) -> Result<TileFetcher, CliError> {
    let api_key = resolve_api_key(cli_api_key, config)?;

    let http_client =
        ReqwestClient::with_timeout(stitch.timeout).map_err(CliError::ProviderCreation)?;
    let provider = StaticMapsProvider::with_template(
        http_client,
        api_key,
        config.provider.url_template.clone(),
    );
    let provider =
        RetryingProvider::new(provider, stitch.max_retries).with_cancellation(cancel.clone());

    Ok(TileFetcher::new(Arc::new(provider))
        .with_cache(TileCache::new(stitch.temp_dir.clone()))
        .with_keep_tiles(stitch.keep_tiles))
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
