//! Static map image provider.
//!
//! Requests one raster per center/zoom/size/map type from a Static Maps style
//! endpoint. The default template targets the Google Maps Static API, which
//! needs an API key with the Maps Static API enabled.
//!
//! # URL Template
//!
//! The template may contain these placeholders:
//!
//! | Placeholder  | Value                         |
//! |--------------|-------------------------------|
//! | `{lat}`      | Center latitude               |
//! | `{lon}`      | Center longitude              |
//! | `{zoom}`     | Zoom level                    |
//! | `{width}`    | Raster width in pixels        |
//! | `{height}`   | Raster height in pixels       |
//! | `{map_type}` | `roadmap`, `satellite`, ...   |
//! | `{api_key}`  | API key                       |

use tracing::trace;

use super::http::redact_key;
use super::{HttpClient, ProviderError, TileFetchRequest, TileProvider};

/// Google Maps Static API endpoint.
pub const DEFAULT_URL_TEMPLATE: &str = "https://maps.googleapis.com/maps/api/staticmap?center={lat},{lon}&zoom={zoom}&size={width}x{height}&maptype={map_type}&key={api_key}";

/// Highest zoom level served by the Static Maps API.
pub const STATIC_MAPS_MAX_ZOOM: u8 = 21;

/// Provider that fills a URL template and downloads the raster.
///
/// # Example
///
/// ```no_run
/// use mapstitch::provider::{ReqwestClient, StaticMapsProvider};
///
/// let client = ReqwestClient::new().unwrap();
/// let provider = StaticMapsProvider::new(client, "YOUR_API_KEY".to_string());
/// ```
pub struct StaticMapsProvider<C: HttpClient> {
    http_client: C,
    api_key: String,
    url_template: String,
}

impl<C: HttpClient> StaticMapsProvider<C> {
    /// Creates a provider for the Google Maps Static API.
    pub fn new(http_client: C, api_key: String) -> Self {
        Self::with_template(http_client, api_key, DEFAULT_URL_TEMPLATE.to_string())
    }

    /// Creates a provider for a custom URL template.
    pub fn with_template(http_client: C, api_key: String, url_template: String) -> Self {
        Self {
            http_client,
            api_key,
            url_template,
        }
    }

    /// Fills the URL template for `request`.
    pub fn build_url(&self, request: &TileFetchRequest) -> String {
        self.url_template
            .replace("{lat}", &request.center.latitude().to_string())
            .replace("{lon}", &request.center.longitude().to_string())
            .replace("{zoom}", &request.zoom.to_string())
            .replace("{width}", &request.width.to_string())
            .replace("{height}", &request.height.to_string())
            .replace("{map_type}", request.map_type.as_str())
            .replace("{api_key}", &self.api_key)
    }
}

impl<C: HttpClient> TileProvider for StaticMapsProvider<C> {
    fn fetch(&self, request: &TileFetchRequest) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(request.zoom) {
            return Err(ProviderError::UnsupportedZoom(request.zoom));
        }

        let url = self.build_url(request);
        trace!(url = %redact_key(&url), "Requesting static map");
        self.http_client.get(&url)
    }

    fn name(&self) -> &str {
        "Static Maps"
    }

    fn max_zoom(&self) -> u8 {
        STATIC_MAPS_MAX_ZOOM
    }
}
