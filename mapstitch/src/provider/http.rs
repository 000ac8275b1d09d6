//! HTTP client abstraction for testability

use std::time::Duration;

use super::types::ProviderError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request, returning the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Blocking HTTP client backed by reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with the default 30 second timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests fail once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mapstitch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

fn request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::HttpError(format!("Request failed: {}", e))
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).send().map_err(request_error)?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(format!(
                "HTTP {} from {}",
                response.status(),
                redact_key(url)
            )));
        }

        let body = response.bytes().map_err(request_error)?;
        if body.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "empty response body".to_string(),
            ));
        }
        Ok(body.to_vec())
    }
}

/// Masks the value of a `key=` query parameter so API keys stay out of logs.
pub(crate) fn redact_key(url: &str) -> String {
    match url.find("key=") {
        Some(pos) => {
            let start = pos + "key=".len();
            let end = url[start..]
                .find('&')
                .map(|i| start + i)
                .unwrap_or(url.len());
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}
