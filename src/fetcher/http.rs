//! Rate-limited GET-and-decode
//!
//! Provides the single entry point used by the API client for every request:
//! - Dual-window rate limiting before each attempt
//! - Bounded retry of 429 responses honouring `Retry-After`
//! - Typed JSON decoding of successful bodies

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::rate_limit::RateLimiter;
use super::retry::{parse_retry_after, RetryPolicy};
use super::{FetchError, FetchResult, Transport};
use crate::metrics::{record_retry_backoff, HttpRequestMetrics};

/// HTTP fetcher sharing one rate-limit ledger across all of its requests
pub struct RateLimitedFetcher {
    transport: Arc<dyn Transport>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl RateLimitedFetcher {
    /// Create new fetcher
    ///
    /// # Arguments
    /// * `transport` - Transport issuing the actual GET requests
    /// * `rate_limiter` - Shared rate limiter (Arc for one ledger across callers)
    /// * `retry` - Policy applied to 429 responses
    pub fn new(
        transport: Arc<dyn Transport>,
        rate_limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            rate_limiter,
            retry,
        }
    }

    /// Retry ceiling for 429 responses
    pub fn max_retries(&self) -> u32 {
        self.retry.max_retries
    }

    /// Execute a GET request and decode the JSON body into `T`
    ///
    /// # Errors
    /// - [`FetchError::Transport`] when no response was received (not retried)
    /// - [`FetchError::Http`] for non-success statuses other than 429
    /// - [`FetchError::RateLimitExhausted`] when 429s outlast the retry ceiling
    /// - [`FetchError::Decode`] when the body is not the expected JSON
    pub async fn get_json<T>(&self, url: &str) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        let endpoint = endpoint_label(url);
        let mut retry_count = 0u32;

        loop {
            let waited = self.rate_limiter.acquire().await;
            if !waited.is_zero() {
                debug!(url, waited_ms = waited.as_millis() as u64, "Rate limiter delayed request");
            }

            let request_metrics = HttpRequestMetrics::start(&endpoint, retry_count);
            let response = match self.transport.get(url).await {
                Ok(resp) => resp,
                Err(e) => {
                    request_metrics.record_network_error();
                    return Err(e);
                }
            };
            request_metrics.record_complete(response.status);

            if response.status == 429 {
                if retry_count >= self.retry.max_retries {
                    warn!(
                        url,
                        attempts = retry_count + 1,
                        "Rate limit (429) persisted past retry ceiling"
                    );
                    return Err(FetchError::RateLimitExhausted {
                        attempts: retry_count + 1,
                        url: url.to_string(),
                    });
                }

                let retry_after = parse_retry_after(response.retry_after.as_deref());
                let delay = self.retry.delay_for(retry_count, retry_after);
                retry_count += 1;
                warn!(
                    url,
                    attempt = retry_count,
                    max_attempts = self.retry.max_attempts(),
                    wait_secs = delay.as_secs_f64(),
                    "429 Too Many Requests: retrying"
                );
                record_retry_backoff(delay, retry_count);
                sleep(delay).await;
                continue;
            }

            if !response.is_success() {
                return Err(FetchError::Http {
                    status: response.status,
                    url: url.to_string(),
                });
            }

            return serde_json::from_slice(&response.body).map_err(|e| {
                FetchError::Decode(format!("Failed to deserialize response from {url}: {e}"))
            });
        }
    }
}

/// Low-cardinality metric label for a URL: its first three path segments
fn endpoint_label(url: &str) -> String {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url)
        .split_once('/')
        .map(|(_, path)| path)
        .unwrap_or("");
    let path = path.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).take(3).collect();
    format!("/{}", segments.join("/"))
}
