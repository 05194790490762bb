//! Lazily allocated mosaic of tiles.

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

/// A `columns x rows` mosaic of equally sized tiles.
///
/// The pixel buffer is allocated when the first tile is pasted. Unless a
/// cell size was fixed up front, that tile's dimensions become the cell
/// size. Tiles of a different size are resampled to the cell size. Cells
/// never pasted stay black.
#[derive(Debug)]
pub struct Canvas {
    columns: u32,
    rows: u32,
    cell: Option<(u32, u32)>,
    image: Option<RgbImage>,
    pasted: usize,
}

impl Canvas {
    /// Create an empty canvas of the given size in tiles.
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cell: None,
            image: None,
            pasted: 0,
        }
    }

    /// Fix the cell size instead of taking it from the first tile.
    pub fn with_cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell = Some((width, height));
        self
    }

    /// Paste a tile into cell (`column`, `row`).
    pub fn paste(&mut self, column: u32, row: u32, tile: &RgbImage) {
        let (cell_w, cell_h) = *self.cell.get_or_insert_with(|| tile.dimensions());

        let image = self.image.get_or_insert_with(|| {
            debug!(
                width = cell_w * self.columns,
                height = cell_h * self.rows,
                "Allocating canvas"
            );
            RgbImage::new(cell_w * self.columns, cell_h * self.rows)
        });

        let x = column as i64 * cell_w as i64;
        let y = row as i64 * cell_h as i64;

        if tile.dimensions() == (cell_w, cell_h) {
            imageops::replace(image, tile, x, y);
        } else {
            let resized = imageops::resize(tile, cell_w, cell_h, FilterType::Triangle);
            imageops::replace(image, &resized, x, y);
        }
        self.pasted += 1;
    }

    /// Whether any tile has been pasted.
    pub fn is_allocated(&self) -> bool {
        self.image.is_some()
    }

    /// Number of tiles pasted so far.
    pub fn tiles_pasted(&self) -> usize {
        self.pasted
    }

    /// Cell size in pixels, once known.
    pub fn tile_dimensions(&self) -> Option<(u32, u32)> {
        self.cell
    }

    /// The mosaic, or `None` if nothing was pasted.
    pub fn into_image(self) -> Option<RgbImage> {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_empty_canvas_is_unallocated() {
        let canvas = Canvas::new(3, 3);
        assert!(!canvas.is_allocated());
        assert_eq!(canvas.tile_dimensions(), None);
        assert!(canvas.into_image().is_none());
    }

    #[test]
    fn test_paste_places_tiles() {
        let mut canvas = Canvas::new(2, 2);
        canvas.paste(1, 0, &RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        canvas.paste(0, 1, &RgbImage::from_pixel(4, 4, Rgb([0, 255, 0])));

        assert_eq!(canvas.tiles_pasted(), 2);
        assert_eq!(canvas.tile_dimensions(), Some((4, 4)));

        let image = canvas.into_image().unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(5, 1), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(2, 6), &Rgb([0, 255, 0]));
        // Unpasted cells stay black
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(7, 7), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_fixed_cell_size() {
        let mut canvas = Canvas::new(2, 2).with_cell_size(4, 4);
        assert!(!canvas.is_allocated());

        canvas.paste(1, 1, &RgbImage::from_pixel(16, 16, Rgb([30, 60, 90])));
        let image = canvas.into_image().unwrap();
        assert_eq!(image.dimensions(), (8, 8));
        assert_eq!(image.get_pixel(6, 6), &Rgb([30, 60, 90]));
    }

    #[test]
    fn test_mismatched_tile_is_resampled() {
        let mut canvas = Canvas::new(2, 1);
        canvas.paste(0, 0, &RgbImage::from_pixel(4, 4, Rgb([10, 10, 10])));
        canvas.paste(1, 0, &RgbImage::from_pixel(8, 8, Rgb([200, 200, 200])));

        let image = canvas.into_image().unwrap();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(6, 2), &Rgb([200, 200, 200]));
    }
}
