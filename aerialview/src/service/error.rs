//! Service and configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::TileError;
use crate::coord::{CoordError, TileCoord};
use crate::grid::GridError;
use crate::provider::ProviderError;
use crate::request::GeometryError;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A value in the configuration file has the wrong form.
    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// The named provider preset does not exist.
    #[error("Unknown provider preset '{0}' (expected one of: osm, esri, usgs, google)")]
    UnknownPreset(String),

    /// The tile URL template is unusable.
    #[error(transparent)]
    Template(ProviderError),

    /// A configuration field is out of range.
    #[error("Invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by [`AerialViewService`](super::AerialViewService).
#[derive(Debug, Error)]
pub enum AerialViewError {
    /// The request was rejected before any tile was fetched.
    #[error("Invalid request: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// The position could not be projected at the configured zoom.
    #[error("Projection failed: {0}")]
    Coord(#[from] CoordError),

    /// The camera sees more tiles than the configured limit allows.
    #[error("Footprint needs {tiles} tiles, exceeding the limit of {max}")]
    FootprintTooLarge { tiles: usize, max: usize },

    /// No tile of the footprint could be resolved.
    #[error("All {tiles} tiles failed ({not_found} not found, {timed_out} timed out)")]
    AllTilesFailed {
        tiles: usize,
        not_found: usize,
        timed_out: usize,
    },

    /// A tile could not be fetched, decoded or stored.
    ///
    /// Raised for transport failures after the last retry and for HTTP
    /// statuses other than 404. Missing tiles never raise this.
    #[error("Tile {}/{}/{} failed: {source}", tile.zoom, tile.x, tile.y)]
    TileFetch {
        tile: TileCoord,
        #[source]
        source: TileError,
    },

    /// The service configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<GridError> for AerialViewError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::AllTilesFailed {
                tiles,
                not_found,
                timed_out,
            } => Self::AllTilesFailed {
                tiles,
                not_found,
                timed_out,
            },
            GridError::TileFailed { tile, source } => Self::TileFetch { tile, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_conversion() {
        let err: AerialViewError = GridError::AllTilesFailed {
            tiles: 121,
            not_found: 121,
            timed_out: 0,
        }
        .into();
        assert!(matches!(err, AerialViewError::AllTilesFailed { tiles: 121, .. }));
        assert!(err.to_string().contains("121 not found"));
    }

    #[test]
    fn test_tile_failure_conversion_keeps_source() {
        use std::error::Error as _;

        let err: AerialViewError = GridError::TileFailed {
            tile: TileCoord::new(68_910, 46_012, 17),
            source: TileError::Http {
                url: "https://tile.example/17/68910/46012.png".into(),
                status: 503,
            },
        }
        .into();

        assert!(matches!(
            err,
            AerialViewError::TileFetch {
                source: TileError::Http { status: 503, .. },
                ..
            }
        ));
        assert!(err.to_string().starts_with("Tile 17/68910/46012 failed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_geometry_error_conversion() {
        let err: AerialViewError = GeometryError::InvalidAltitude(-1.0).into();
        assert!(matches!(err, AerialViewError::InvalidGeometry(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            section: "fetch".into(),
            key: "concurrency".into(),
            value: "lots".into(),
            reason: "expected an integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value 'lots' for [fetch] concurrency: expected an integer"
        );
    }
}
