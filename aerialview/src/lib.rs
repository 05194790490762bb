//! AerialView - Simulated aerial camera imagery from slippy-map tiles
//!
//! This library synthesizes the image a downward-looking camera would see
//! from a given position, heading, altitude and field of view. Tiles are
//! downloaded from any `{z}/{x}/{y}` tile server, cached on disk as PNG, and
//! composited into a mosaic that is rotated, cropped and resized into the
//! camera frame.
//!
//! ```ignore
//! use aerialview::service::{AerialViewService, ServiceConfig};
//!
//! let service = AerialViewService::new(ServiceConfig::default())?;
//! let image = service
//!     .get_aerial_image_at(47.3769, 8.5417, 90.0, 150.0, 60.0, (512, 512))
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod flight;
pub mod grid;
pub mod logging;
pub mod provider;
pub mod request;
pub mod service;
pub mod telemetry;
pub mod view;

pub use request::{AerialViewRequest, CameraSpec, GeoPose, OutputSize};
pub use service::{AerialViewError, AerialViewService, ServiceConfig};
