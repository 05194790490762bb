//! Tile resolution errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving a single tile.
#[derive(Debug, Error)]
pub enum TileError {
    /// Transport failures persisted through every allowed attempt.
    #[error("Fetch failed for {url} after {attempts} attempt(s): {reason}")]
    Fetch {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The server has no tile at this address.
    #[error("Tile not found: {url}")]
    NotFound { url: String },

    /// The server answered successfully with an empty body.
    #[error("Empty response body from {url}")]
    EmptyResponse { url: String },

    /// The server answered with a non-success, non-404 status.
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// The body could not be decoded as an image.
    #[error("Failed to decode tile from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The decoded tile could not be encoded for the cache.
    #[error("Failed to encode tile for cache: {0}")]
    Encode(String),

    /// Reading or writing the cache failed.
    #[error("Cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A blocking cache task panicked or was cancelled.
    #[error("Cache task failed: {0}")]
    Task(String),
}

impl TileError {
    /// Whether the server simply has no tile here (404 or empty body).
    ///
    /// These are expected at the edge of coverage and are never retried.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyResponse { .. })
    }
}
