//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude),
//! fractional Web Mercator tile positions, and ground distances covered by a
//! tile, a pixel, or the simulated camera.
//!
//! All functions are pure. Web Mercator is singular at the poles, so
//! [`to_tile_position`] requires `|lat| <= 85.05112878` and reports anything
//! beyond that as an error instead of clamping.

mod types;

pub use types::{
    CoordError, TileCoord, TilePosition, EARTH_CIRCUMFERENCE_M, EARTH_RADIUS_M, MAX_LAT,
    MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Edge length in meters of the square ground footprint seen by a camera
/// looking straight down.
///
/// # Arguments
///
/// * `altitude` - Height above ground in meters
/// * `fov` - Full field of view in degrees
#[inline]
pub fn square_at_camera(altitude: f64, fov: f64) -> f64 {
    2.0 * altitude * (fov.to_radians() / 2.0).tan()
}

/// Ground length in meters of one tile edge at the given latitude and zoom.
///
/// Halves with every zoom increment and shrinks with `cos(lat)` toward the
/// poles.
#[inline]
pub fn square_at_zoom_level(lat: f64, zoom: u8) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / 2.0_f64.powi(zoom as i32)
}

/// Ground resolution in meters per pixel at the given latitude and zoom.
#[inline]
pub fn pixel_at_zoom_level(lat: f64, zoom: u8, tile_size: u32) -> f64 {
    square_at_zoom_level(lat, zoom) / tile_size as f64
}

/// Converts geographic coordinates to a fractional tile position.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
///
/// # Returns
///
/// The fractional position or an error if inputs are outside the projection.
#[inline]
pub fn to_tile_position(lat: f64, lon: f64, zoom: u8) -> Result<TilePosition, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let x = (lon + 180.0) / 360.0 * n;

    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    Ok(TilePosition { x, y, zoom })
}

/// Converts a (possibly fractional) tile position back to latitude/longitude.
///
/// Integral inputs give the northwest corner of the tile.
#[inline]
pub fn tile_to_lat_lon(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = x / n * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();

    (lat_rad.to_degrees(), lon)
}

/// Great-circle destination reached from a start point after travelling
/// `distance` meters on the given true `bearing` (degrees).
///
/// Uses a spherical Earth of radius [`EARTH_RADIUS_M`]. The returned
/// longitude is normalised to [-180, 180).
pub fn destination_point(lat: f64, lon: f64, distance: f64, bearing: f64) -> (f64, f64) {
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let brg = bearing.to_radians();
    let delta = distance / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * brg.cos()).asin();
    let lon2 = lon1
        + (brg.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    let lon2 = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    (lat2.to_degrees(), lon2)
}
