//! CLI error type.

use std::path::PathBuf;

use aerialview::logging::LoggingError;
use aerialview::service::{AerialViewError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Service(#[from] AerialViewError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to write {}: {source}", path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache statistics: {0}")]
    CacheStats(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) | CliError::InvalidArgument(_) => 2,
            CliError::Service(AerialViewError::InvalidGeometry(_)) => 2,
            CliError::Service(AerialViewError::Config(_)) => 2,
            _ => 1,
        }
    }
}
