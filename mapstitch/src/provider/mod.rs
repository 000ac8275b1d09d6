//! Static map tile provider abstraction
//!
//! This module provides the [`TileProvider`] trait that the build pipeline
//! fetches rasters through, an HTTP-backed implementation for Static Maps
//! style endpoints, and a retry decorator.
//!
//! ```ignore
//! use mapstitch::provider::{ReqwestClient, RetryingProvider, StaticMapsProvider};
//!
//! let http_client = ReqwestClient::new()?;
//! let provider = RetryingProvider::new(StaticMapsProvider::new(http_client, api_key), 2);
//! ```

mod http;
mod retry;
mod static_maps;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT};
pub use retry::{RetryingProvider, DEFAULT_RETRY_DELAY};
pub use static_maps::{StaticMapsProvider, DEFAULT_URL_TEMPLATE, STATIC_MAPS_MAX_ZOOM};
pub use types::{ProviderError, TileFetchRequest, TileProvider};

#[cfg(test)]
pub use http::tests::MockHttpClient;
