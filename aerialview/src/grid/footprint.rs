//! Camera footprint and rotation margin.

use crate::coord::{self, CoordError, TilePosition};

use super::BoundingBox;

/// Minimum number of margin tiles kept on every side of the centre tile.
pub const MIN_EXTRA_TILES: u32 = 5;

/// Margin tiles needed on each side so that a square `ratio` tiles wide
/// stays covered under any rotation.
///
/// # Returns
///
/// `max(ceil((ceil(ratio) - 1) / 2), MIN_EXTRA_TILES)`
pub fn extra_tiles_for(ratio: f64) -> u32 {
    let raw = ((ratio.ceil() - 1.0) / 2.0).ceil();
    if raw.is_nan() || raw <= MIN_EXTRA_TILES as f64 {
        MIN_EXTRA_TILES
    } else {
        raw as u32
    }
}

/// Ground geometry of one camera request at a fixed zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Edge of the square seen by the camera (meters).
    pub camera_m: f64,
    /// Edge of the square that contains the camera square at any rotation.
    pub rotation_safe_m: f64,
    /// Edge of one tile at this latitude and zoom (meters).
    pub tile_m: f64,
    /// `rotation_safe_m / tile_m`.
    pub ratio: f64,
    /// Margin tiles on each side of the centre tile.
    pub extra_tiles: u32,
    /// Fractional tile position of the camera.
    pub center: TilePosition,
}

impl Footprint {
    /// Compute the footprint of a downward-looking camera.
    ///
    /// # Arguments
    ///
    /// * `lat`, `lon` - Camera position in degrees
    /// * `altitude` - Height above ground in meters
    /// * `fov` - Full field of view in degrees
    /// * `zoom` - Tile zoom level
    pub fn compute(
        lat: f64,
        lon: f64,
        altitude: f64,
        fov: f64,
        zoom: u8,
    ) -> Result<Self, CoordError> {
        let center = coord::to_tile_position(lat, lon, zoom)?;

        let camera_m = coord::square_at_camera(altitude, fov);
        let rotation_safe_m = camera_m * std::f64::consts::SQRT_2;
        let tile_m = coord::square_at_zoom_level(lat, zoom);
        let ratio = rotation_safe_m / tile_m;

        Ok(Self {
            camera_m,
            rotation_safe_m,
            tile_m,
            ratio,
            extra_tiles: extra_tiles_for(ratio),
            center,
        })
    }

    /// Tiles to fetch: the centre tile plus the margin on every side.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(&self.center, self.extra_tiles)
    }

    /// Camera position in canvas pixels for tiles of the given size.
    pub fn center_pixel(&self, tile_width: u32, tile_height: u32) -> (f64, f64) {
        let (fx, fy) = self.center.fract();
        let e = self.extra_tiles as f64;
        ((e + fx) * tile_width as f64, (e + fy) * tile_height as f64)
    }

    /// Edge of the camera square in canvas pixels.
    pub fn camera_pixels(&self, tile_px: u32) -> f64 {
        self.camera_m / (self.tile_m / tile_px as f64)
    }

    /// Half the side of the square to crop around the camera pixel.
    pub fn crop_half_width(&self, tile_px: u32) -> u32 {
        let half = (self.camera_pixels(tile_px) / 2.0).ceil();
        if half.is_finite() && half >= 1.0 {
            half as u32
        } else {
            1
        }
    }
}
