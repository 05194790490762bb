//! Tile bounding boxes.

use crate::coord::{TileCoord, TilePosition};

/// Rectangle of tile indices, half-open on the max side.
///
/// Enumerates every `(x, y)` with `min_x <= x < max_x` and
/// `min_y <= y < max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Box from `floor(center) - extra` to `ceil(center) + extra`.
    pub fn around(center: &TilePosition, extra: u32) -> Self {
        let e = extra as i32;
        Self {
            min_x: center.x.floor() as i32 - e,
            min_y: center.y.floor() as i32 - e,
            max_x: center.x.ceil() as i32 + e,
            max_y: center.y.ceil() as i32 + e,
        }
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    /// All tiles in row-major order.
    pub fn tiles(&self, zoom: u8) -> Vec<TileCoord> {
        (self.min_y..self.max_y)
            .flat_map(|y| (self.min_x..self.max_x).map(move |x| TileCoord::new(x, y, zoom)))
            .collect()
    }

    /// Column and row of a tile inside the box, or `None` if outside.
    pub fn offset_of(&self, tile: &TileCoord) -> Option<(u32, u32)> {
        if (self.min_x..self.max_x).contains(&tile.x) && (self.min_y..self.max_y).contains(&tile.y)
        {
            Some(((tile.x - self.min_x) as u32, (tile.y - self.min_y) as u32))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64) -> TilePosition {
        TilePosition { x, y, zoom: 10 }
    }

    #[test]
    fn test_around_fractional_center() {
        let bbox = BoundingBox::around(&pos(100.4, 200.6), 5);
        assert_eq!(
            bbox,
            BoundingBox {
                min_x: 95,
                min_y: 195,
                max_x: 106,
                max_y: 206
            }
        );
        assert_eq!(bbox.columns(), 11);
        assert_eq!(bbox.rows(), 11);
        assert_eq!(bbox.tile_count(), 121);
    }

    #[test]
    fn test_around_integral_center() {
        let bbox = BoundingBox::around(&pos(100.0, 200.0), 5);
        assert_eq!(bbox.columns(), 10);
        assert_eq!(bbox.rows(), 10);
    }

    #[test]
    fn test_tiles_row_major_and_half_open() {
        let bbox = BoundingBox {
            min_x: 0,
            min_y: 0,
            max_x: 2,
            max_y: 2,
        };
        let tiles = bbox.tiles(3);
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(0, 0, 3),
                TileCoord::new(1, 0, 3),
                TileCoord::new(0, 1, 3),
                TileCoord::new(1, 1, 3),
            ]
        );
    }

    #[test]
    fn test_offset_of() {
        let bbox = BoundingBox::around(&pos(10.5, 20.5), 5);
        assert_eq!(bbox.offset_of(&TileCoord::new(5, 15, 10)), Some((0, 0)));
        assert_eq!(bbox.offset_of(&TileCoord::new(10, 20, 10)), Some((5, 5)));
        assert_eq!(bbox.offset_of(&TileCoord::new(16, 20, 10)), None);
        assert_eq!(bbox.offset_of(&TileCoord::new(4, 20, 10)), None);
    }
}
