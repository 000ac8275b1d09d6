//! Provider types and traits

use std::fmt;

use crate::coord::GeoPoint;
use crate::request::MapType;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    HttpError(String),
    /// Request exceeded the client timeout
    Timeout(String),
    /// Zoom level not supported by this provider
    UnsupportedZoom(u8),
    /// Invalid response data from provider
    InvalidResponse(String),
}

impl ProviderError {
    /// Returns true for transport failures worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::HttpError(_) | ProviderError::Timeout(_))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Parameters of one raster fetch.
///
/// Identical requests are idempotent: the provider returns the same raster
/// and the tile cache stores it under the same key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileFetchRequest {
    /// Geographic center of the raster
    pub center: GeoPoint,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub map_type: MapType,
}

/// Trait for static map tile providers.
///
/// Implementors return the encoded raster (PNG, JPEG, ...) for a request.
pub trait TileProvider: Send + Sync {
    /// Fetches the raster for `request`.
    fn fetch(&self, request: &TileFetchRequest) -> Result<Vec<u8>, ProviderError>;

    /// Returns the provider's name for logging and identification.
    fn name(&self) -> &str;

    /// Returns the maximum supported zoom level.
    fn max_zoom(&self) -> u8;

    /// Checks if this provider supports the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom <= self.max_zoom()
    }
}
