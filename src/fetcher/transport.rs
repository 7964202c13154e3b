//! reqwest-backed transport
//!
//! A single `reqwest::Client` is shared by every transport instance so that
//! connection pooling works across all requests of a run.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::{FetchError, FetchResult, Transport, TransportResponse};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Riot-Token";

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// HTTP request timeout (seconds) - overall time for the entire request
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Global HTTP client shared by all transports
static GLOBAL_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                panic!("FATAL: Failed to build HTTP client: {e}. Check system TLS configuration.")
            }),
    )
});

/// Get the global HTTP client
pub fn global_http_client() -> Arc<Client> {
    GLOBAL_HTTP_CLIENT.clone()
}

/// Transport that sends authenticated GET requests with reqwest
pub struct ReqwestTransport {
    client: Arc<Client>,
    api_key: String,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ReqwestTransport {
    /// Transport using the global client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(global_http_client(), api_key)
    }

    /// Transport using a caller-provided client
    pub fn with_client(client: Arc<Client>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetchResult<TransportResponse> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}
