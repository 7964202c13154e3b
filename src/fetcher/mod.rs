//! Rate-limited HTTP fetching
//!
//! Every request to the upstream API goes through a [`RateLimitedFetcher`], which
//! consults the shared [`RateLimiter`] ledger, issues the GET over a [`Transport`],
//! retries 429 responses according to its [`RetryPolicy`] and decodes the JSON body.

use async_trait::async_trait;

pub mod http;
pub mod rate_limit;
pub mod retry;
pub mod transport;

pub use http::RateLimitedFetcher;
pub use rate_limit::{RateLimiter, WindowLimits};
pub use retry::RetryPolicy;
pub use transport::ReqwestTransport;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network-level failure (timeout, connection reset, DNS). Not retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status other than 429
    #[error("HTTP error {status} from {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Still receiving 429 after the configured number of retries
    #[error("rate limit still exceeded after {attempts} attempts for {url}")]
    RateLimitExhausted {
        /// Total attempts made, including the first
        attempts: u32,
        /// Requested URL
        url: String,
    },

    /// Response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::RateLimitExhausted { .. } => Some(429),
            _ => None,
        }
    }
}

/// Result type for fetcher operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Raw response handed back by a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw `Retry-After` header value, if present
    pub retry_after: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Successful response with a JSON body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Response with the given status and an empty body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: Vec::new(),
        }
    }

    /// 429 response carrying a `Retry-After` header
    pub fn too_many_requests(retry_after: Option<&str>) -> Self {
        Self {
            status: 429,
            retry_after: retry_after.map(str::to_owned),
            body: Vec::new(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET round-trip to the upstream API
///
/// Implementations only move bytes; rate limiting, retries and decoding are the
/// fetcher's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request and return status, `Retry-After` and body
    ///
    /// # Errors
    /// Returns [`FetchError::Transport`] when no HTTP response was received
    async fn get(&self, url: &str) -> FetchResult<TransportResponse>;
}
