//! Camera request types.
//!
//! A request pairs where the camera is and which way it faces
//! ([`GeoPose`]) with how it sees ([`CameraSpec`]). Both are validated
//! before any tile is fetched.

use thiserror::Error;

use crate::coord::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Default output width in pixels.
pub const DEFAULT_OUTPUT_WIDTH: u32 = 512;

/// Default output height in pixels.
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 512;

/// Rejected request geometry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("Latitude {0} is outside the renderable range [-85.05112878, 85.05112878]")]
    InvalidLatitude(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    #[error("Bearing {0} is not a finite angle")]
    InvalidBearing(f64),

    #[error("Altitude {0} must be a positive number of meters")]
    InvalidAltitude(f64),

    #[error("Field of view {0} must be strictly between 0 and 180 degrees")]
    InvalidFieldOfView(f64),

    #[error("Output size {width}x{height} must be non-zero")]
    InvalidOutputSize { width: u32, height: u32 },
}

/// Camera position and heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPose {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Heading in degrees, clockwise from north. Any finite value.
    pub bearing: f64,
}

impl GeoPose {
    pub fn new(latitude: f64, longitude: f64, bearing: f64) -> Self {
        Self {
            latitude,
            longitude,
            bearing,
        }
    }

    /// Check the pose can be rendered in Web Mercator.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(MIN_LAT..=MAX_LAT).contains(&self.latitude) {
            return Err(GeometryError::InvalidLatitude(self.latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&self.longitude) {
            return Err(GeometryError::InvalidLongitude(self.longitude));
        }
        if !self.bearing.is_finite() {
            return Err(GeometryError::InvalidBearing(self.bearing));
        }
        Ok(())
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// As a `(width, height)` tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_WIDTH, DEFAULT_OUTPUT_HEIGHT)
    }
}

/// Downward-looking camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpec {
    /// Height above ground in meters.
    pub altitude: f64,
    /// Full field of view in degrees.
    pub fov: f64,
    /// Output image size.
    pub output: OutputSize,
}

impl CameraSpec {
    /// Camera with the default 512x512 output.
    pub fn new(altitude: f64, fov: f64) -> Self {
        Self {
            altitude,
            fov,
            output: OutputSize::default(),
        }
    }

    pub fn with_output(mut self, width: u32, height: u32) -> Self {
        self.output = OutputSize::new(width, height);
        self
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.altitude.is_finite() && self.altitude > 0.0) {
            return Err(GeometryError::InvalidAltitude(self.altitude));
        }
        if !(self.fov.is_finite() && self.fov > 0.0 && self.fov < 180.0) {
            return Err(GeometryError::InvalidFieldOfView(self.fov));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(GeometryError::InvalidOutputSize {
                width: self.output.width,
                height: self.output.height,
            });
        }
        Ok(())
    }
}

/// One camera frame request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AerialViewRequest {
    pub pose: GeoPose,
    pub camera: CameraSpec,
}

impl AerialViewRequest {
    pub fn new(pose: GeoPose, camera: CameraSpec) -> Self {
        Self { pose, camera }
    }

    /// Validate pose and camera.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.pose.validate()?;
        self.camera.validate()
    }
}
