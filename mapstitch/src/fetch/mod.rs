//! Raster retrieval for grid cells.
//!
//! [`TileFetcher`] turns a [`GridCell`] into a decoded RGB raster, going
//! through the tile cache when one is configured.

use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheError, TileCache};
use crate::grid::GridCell;
use crate::provider::{ProviderError, TileFetchRequest, TileProvider};
use crate::request::MapType;

/// Errors from fetching or decoding a cell's raster.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("tile cache error: {0}")]
    Cache(#[from] CacheError),
}

impl FetchError {
    /// Returns true if repeating the fetch might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Provider(e) => e.is_transient(),
            FetchError::Decode(_) => false,
            FetchError::Cache(_) => true,
        }
    }
}

/// Fetches and decodes cell rasters.
pub struct TileFetcher {
    provider: Arc<dyn TileProvider>,
    cache: Option<TileCache>,
    keep_tiles: bool,
}

impl TileFetcher {
    /// Creates a fetcher that always goes to the provider.
    pub fn new(provider: Arc<dyn TileProvider>) -> Self {
        Self {
            provider,
            cache: None,
            keep_tiles: false,
        }
    }

    /// Routes fetches through `cache`.
    pub fn with_cache(mut self, cache: TileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Keeps cached rasters after they have been decoded.
    pub fn with_keep_tiles(mut self, keep_tiles: bool) -> Self {
        self.keep_tiles = keep_tiles;
        self
    }

    pub fn provider(&self) -> &dyn TileProvider {
        self.provider.as_ref()
    }

    pub fn cache(&self) -> Option<&TileCache> {
        self.cache.as_ref()
    }

    /// Fetches the raster for `cell` and decodes it to RGB.
    ///
    /// With a cache configured, a cached raster is used when present and a
    /// fetched one is written before decoding. Unless tiles are kept, the
    /// cache file is removed once decoded.
    pub fn fetch(
        &self,
        cell: &GridCell,
        zoom: u8,
        map_type: MapType,
    ) -> Result<RgbImage, FetchError> {
        let request = TileFetchRequest {
            center: cell.center,
            zoom,
            width: cell.fetch_width,
            height: cell.fetch_height,
            map_type,
        };

        let data = match &self.cache {
            Some(cache) => match cache.get(&request)? {
                Some(data) => data,
                None => {
                    let data = self.provider.fetch(&request)?;
                    cache.put(&request, &data)?;
                    data
                }
            },
            None => self.provider.fetch(&request)?,
        };

        debug!(
            row = cell.row,
            col = cell.col,
            center = %cell.center,
            bytes = data.len(),
            "Fetched tile"
        );

        let image = image::load_from_memory(&data)?.to_rgb8();

        if !self.keep_tiles {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.remove(&request) {
                    warn!(
                        row = cell.row,
                        col = cell.col,
                        error = %e,
                        "Failed to remove cached tile"
                    );
                }
            }
        }

        Ok(image)
    }
}
