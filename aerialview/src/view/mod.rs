//! Camera view synthesis.
//!
//! Given the assembled mosaic and the camera pixel, rotates the mosaic so
//! the heading points up, crops the square the camera sees and resamples
//! it to the requested output size.

mod rotate;
mod synthesizer;

pub use rotate::{crop, rotate_about, rotated_crop};
pub use synthesizer::{ViewGeometry, ViewSynthesizer};
