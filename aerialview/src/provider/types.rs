//! Provider error types.

use thiserror::Error;

/// Errors returned by tile server requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, reset, truncated body).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server has no tile at this address.
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status other than 404.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The URL template is unusable.
    #[error("Invalid URL template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl ProviderError {
    /// Whether the failure is worth retrying.
    ///
    /// Only transport failures are retried; a definite answer from the
    /// server (any status code) is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
