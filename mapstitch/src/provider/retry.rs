//! Retry decorator for tile providers.

use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ProviderError, TileFetchRequest, TileProvider};

/// Default pause before the first retry; doubled after each attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Upper bound on a single pause between attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

/// How often a pause checks for cancellation.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Wraps a provider and retries transient failures.
///
/// Fetches are idempotent, so repeating a failed request is always safe.
/// Only [`ProviderError::is_transient`] errors are retried. The pause doubles
/// after each attempt up to [`MAX_RETRY_DELAY`]. Once the cancellation token
/// fires, the pending pause ends and the last error is returned.
pub struct RetryingProvider<P> {
    inner: P,
    max_retries: u32,
    delay: Duration,
    cancel: Option<CancellationToken>,
}

impl<P: TileProvider> RetryingProvider<P> {
    pub fn new(inner: P, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            delay: DEFAULT_RETRY_DELAY,
            cancel: None,
        }
    }

    /// Sets the pause before the first retry.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay.min(MAX_RETRY_DELAY);
        self
    }

    /// Stops retrying once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Pause before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// Sleeps for `delay`, returning false if cancelled first.
    fn pause(&self, delay: Duration) -> bool {
        let Some(cancel) = &self.cancel else {
            thread::sleep(delay);
            return true;
        };

        let deadline = Instant::now() + delay;
        loop {
            if cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(CANCEL_POLL_INTERVAL));
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl<P: TileProvider> TileProvider for RetryingProvider<P> {
    fn fetch(&self, request: &TileFetchRequest) -> Result<Vec<u8>, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(request) {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    if self.is_cancelled() {
                        return Err(e);
                    }
                    attempt += 1;
                    warn!(
                        center = %request.center,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    if !self.pause(self.delay_for(attempt)) {
                        debug!(center = %request.center, "Retry abandoned after cancellation");
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn max_zoom(&self) -> u8 {
        self.inner.max_zoom()
    }
}
