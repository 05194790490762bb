//! Aerial view service.
//!
//! [`AerialViewService`] ties the pipeline together: validate the request,
//! compute the footprint and bounding box, assemble the tile mosaic through
//! the cache and synthesize the camera image.

mod aerial_view;
mod config;
mod error;

pub use aerial_view::{AerialViewService, RenderedView, ViewPlan};
pub use config::{
    default_cache_dir, ServiceConfig, CACHE_DIR_NAME, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_TILES_PER_REQUEST, DEFAULT_RETRY_BACKOFF, DEFAULT_TILE_SIZE, DEFAULT_ZOOM,
};
pub use error::{AerialViewError, ConfigError};
