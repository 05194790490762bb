//! Nearest-neighbour rotation and black-padded cropping.
//!
//! Rotation maps every output pixel centre back into the source image and
//! takes the pixel it lands in. Source positions outside the image are
//! black. A positive angle turns the picture counter-clockwise.

use image::imageops;
use image::RgbImage;
use rayon::prelude::*;

/// Crop a `width x height` window at (`x`, `y`), padding with black where
/// the window leaves the image.
pub fn crop(image: &RgbImage, x: i64, y: i64, width: u32, height: u32) -> RgbImage {
    let mut out = RgbImage::new(width, height);
    imageops::replace(&mut out, image, -x, -y);
    out
}

/// Rotate a whole image about (`cx`, `cy`) by `degrees` counter-clockwise,
/// keeping its size.
pub fn rotate_about(image: &RgbImage, cx: f64, cy: f64, degrees: f64) -> RgbImage {
    let (width, height) = image.dimensions();
    rotated_crop(image, cx, cy, degrees, 0, 0, width, height)
}

/// Rotate about (`cx`, `cy`) and crop in one pass.
///
/// Equivalent to `crop(&rotate_about(image, cx, cy, degrees), x0, y0, width,
/// height)` without materialising the full rotated image. Angles that are
/// whole turns reduce to a plain crop.
#[allow(clippy::too_many_arguments)]
pub fn rotated_crop(
    image: &RgbImage,
    cx: f64,
    cy: f64,
    degrees: f64,
    x0: i64,
    y0: i64,
    width: u32,
    height: u32,
) -> RgbImage {
    let theta = degrees.rem_euclid(360.0);
    if theta == 0.0 || !theta.is_finite() {
        return crop(image, x0, y0, width, height);
    }

    let mut out = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let (sin, cos) = theta.to_radians().sin_cos();
    let sin = snap(sin);
    let cos = snap(cos);
    let (src_w, src_h) = image.dimensions();
    let row_len = width as usize * 3;

    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(v, row)| {
            let dy = (y0 + v as i64) as f64 + 0.5 - cy;
            for u in 0..width as usize {
                let dx = (x0 + u as i64) as f64 + 0.5 - cx;
                let sx = (cx + cos * dx - sin * dy).floor();
                let sy = (cy + sin * dx + cos * dy).floor();

                if sx >= 0.0 && sy >= 0.0 && sx < src_w as f64 && sy < src_h as f64 {
                    let pixel = image.get_pixel(sx as u32, sy as u32);
                    row[u * 3..u * 3 + 3].copy_from_slice(&pixel.0);
                }
            }
        });

    out
}

/// Flush sin/cos noise at quarter turns to exact zero.
fn snap(value: f64) -> f64 {
    if value.abs() < 1e-15 {
        0.0
    } else {
        value
    }
}
