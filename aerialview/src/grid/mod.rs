//! Tile grid assembly.
//!
//! Turns a camera request into the set of tiles that covers it with enough
//! margin to survive any rotation, fetches them concurrently and pastes
//! them into one mosaic.

mod assembler;
mod bbox;
mod canvas;
mod footprint;

pub use assembler::{
    AssembledGrid, AssemblyReport, GridAssembler, GridError, DEFAULT_CONCURRENCY,
};
pub use bbox::BoundingBox;
pub use canvas::Canvas;
pub use footprint::{extra_tiles_for, Footprint, MIN_EXTRA_TILES};
