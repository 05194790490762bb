//! Coordinate types and constants for the Web Mercator tile grid.

use thiserror::Error;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (degrees).
pub const MAX_LON: f64 = 180.0;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level served by common slippy-map providers.
pub const MAX_ZOOM: u8 = 22;

/// Mean Earth radius used by the spherical Mercator model (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Equatorial circumference of the spherical Earth (meters).
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M;

/// Errors from coordinate conversion.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordError {
    /// Latitude is outside the Web Mercator range.
    #[error("Invalid latitude {0}: must be within [-85.05112878, 85.05112878]")]
    InvalidLatitude(f64),

    /// Longitude is outside [-180, 180].
    #[error("Invalid longitude {0}: must be within [-180, 180]")]
    InvalidLongitude(f64),

    /// Zoom level exceeds the supported maximum.
    #[error("Invalid zoom level {0}: must be at most 22")]
    InvalidZoom(u8),
}

/// Integral tile address on the slippy-map grid.
///
/// `x` grows eastward and `y` grows southward. Indices are signed because a
/// bounding box with rotation margin may reach past the edge of the grid near
/// the antimeridian or the poles. Use [`TileCoord::wrapped`] to get the tile
/// a server actually has for such an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column (X).
    pub x: i32,
    /// Row (Y).
    pub y: i32,
    /// Zoom level.
    pub zoom: u8,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(x: i32, y: i32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Whether this tile exists on the grid at its zoom level.
    pub fn is_on_grid(&self) -> bool {
        let n = 1i64 << self.zoom;
        (0..n).contains(&(self.x as i64)) && (0..n).contains(&(self.y as i64))
    }

    /// The on-grid tile this address shows.
    ///
    /// Columns wrap around the antimeridian, so `x = -1` is the last column.
    /// Rows do not wrap: beyond the poles there is no tile and this returns
    /// `None`.
    pub fn wrapped(&self) -> Option<TileCoord> {
        let n = 1i64 << self.zoom;
        if !(0..n).contains(&(self.y as i64)) {
            return None;
        }
        let x = (self.x as i64).rem_euclid(n) as i32;
        Some(TileCoord::new(x, self.y, self.zoom))
    }
}

/// Fractional position on the tile grid.
///
/// The integral part selects the tile and the fractional part is the
/// position inside it, as a fraction of the tile edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    /// Fractional column.
    pub x: f64,
    /// Fractional row.
    pub y: f64,
    /// Zoom level.
    pub zoom: u8,
}

impl TilePosition {
    /// The tile containing this position.
    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x.floor() as i32, self.y.floor() as i32, self.zoom)
    }

    /// Fractional offset inside the containing tile, each in `[0, 1)`.
    pub fn fract(&self) -> (f64, f64) {
        (self.x - self.x.floor(), self.y - self.y.floor())
    }
}
