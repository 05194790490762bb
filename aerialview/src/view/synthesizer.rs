//! Camera view synthesis from an assembled mosaic.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::trace;

use super::rotate::{crop, rotated_crop};

/// Where the camera sits in the mosaic and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    /// Camera position in mosaic pixels.
    pub center: (f64, f64),
    /// Half the side of the square seen by the camera, in mosaic pixels.
    pub half_width: u32,
    /// Heading in degrees, clockwise from north.
    pub bearing: f64,
}

impl ViewGeometry {
    /// Side of the cropped square in mosaic pixels.
    pub fn side(&self) -> u32 {
        self.half_width.saturating_mul(2)
    }

    /// Top-left corner of the cropped square.
    pub fn origin(&self) -> (i64, i64) {
        let d = self.half_width as f64;
        (
            (self.center.0 - d).round() as i64,
            (self.center.1 - d).round() as i64,
        )
    }
}

/// Produces the camera image: rotate so the heading points up, crop the
/// camera square, resize to the output size.
#[derive(Debug, Clone, Copy)]
pub struct ViewSynthesizer {
    filter: FilterType,
}

impl Default for ViewSynthesizer {
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl ViewSynthesizer {
    /// Synthesizer with bilinear resampling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different resampling filter for the final resize.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Render the view.
    ///
    /// Rotation is skipped for a zero bearing. Everything outside the mosaic
    /// is black.
    pub fn synthesize(
        &self,
        mosaic: &RgbImage,
        geometry: &ViewGeometry,
        output: (u32, u32),
    ) -> RgbImage {
        let (cx, cy) = geometry.center;
        let (x0, y0) = geometry.origin();
        let side = geometry.side();

        let square = if geometry.bearing != 0.0 {
            rotated_crop(mosaic, cx, cy, geometry.bearing, x0, y0, side, side)
        } else {
            crop(mosaic, x0, y0, side, side)
        };

        trace!(
            cx,
            cy,
            side,
            bearing = geometry.bearing,
            width = output.0,
            height = output.1,
            "Synthesizing view"
        );

        if square.dimensions() == output {
            square
        } else {
            imageops::resize(&square, output.0, output.1, self.filter)
        }
    }
}
