//! Tile cache.
//!
//! [`TileCacheClient`] resolves a tile URL to a decoded RGB image, reading
//! it from a [`TileStore`] when present and downloading it otherwise. The
//! disk store is a flat directory of `<key>.png` files whose listing is the
//! only index. Entries never expire and are never deleted by this crate.

mod client;
mod error;
mod key;
mod stats;
mod store;

pub use client::{encode_png, ResolvedTile, TileCacheClient, TileSource};
pub use error::TileError;
pub use key::{alphanumeric_key, CacheKeyScheme};
pub use stats::{disk_cache_stats, format_size, DiskCacheStats};
pub use store::{DiskTileStore, MemoryTileStore, TileStore, TILE_EXTENSION};
