//! HTTP client abstraction for testability

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;

use super::types::ProviderError;

/// Default timeout for a single tile request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default User-Agent sent with tile requests.
///
/// Public tile servers (OpenStreetMap in particular) reject anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("aerialview/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body, or:
    /// - [`ProviderError::NotFound`] for a 404 status
    /// - [`ProviderError::HttpStatus`] for any other non-success status
    /// - [`ProviderError::Transport`] when no usable response arrived
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, ProviderError>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, ProviderError>> + Send {
        (**self).get(url)
    }
}

/// Real HTTP client implementation using reqwest.
///
/// Wraps a single long-lived `reqwest::Client` so that connections are
/// pooled across tiles and across requests.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Creates a new ReqwestClient with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Bytes, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to read response: {}", e)))
    }
}
