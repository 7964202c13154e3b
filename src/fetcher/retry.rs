//! Retry policy for 429 responses
//!
//! The wait before a retry is the larger of the server's `Retry-After` hint and
//! an exponential backoff for the attempt number, plus a small random jitter.

use rand::Rng;
use std::time::Duration;

/// Default number of retries after the first 429
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Wait used when a 429 carries no usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Initial backoff delay in milliseconds
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay in milliseconds
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Upper bound of the random jitter added to each wait
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(250);

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let factor = 2u64.saturating_pow(retry_count);
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(factor).min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}

/// Interpret a `Retry-After` header value given in whole seconds
///
/// Falls back to [`DEFAULT_RETRY_AFTER`] when the header is absent or malformed.
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Bounded retry behaviour for rate-limited requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Upper bound of the random jitter
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// Policy with the given retry ceiling and default jitter
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    /// Replace the jitter bound
    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before retry number `retry_count` (0-based)
    pub fn delay_for(&self, retry_count: u32, retry_after: Duration) -> Duration {
        retry_after.max(calculate_backoff(retry_count)) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}
