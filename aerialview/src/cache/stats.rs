//! Disk cache statistics.

use std::fmt;
use std::io;
use std::path::Path;

use super::store::TILE_EXTENSION;

/// Summary of the tiles held in a cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCacheStats {
    /// Number of cached tile files.
    pub files: u64,
    /// Total size of cached tile files in bytes.
    pub bytes: u64,
}

impl DiskCacheStats {
    /// Mean size of one cached tile, or `None` for an empty cache.
    pub fn average_tile_bytes(&self) -> Option<u64> {
        self.bytes.checked_div(self.files)
    }
}

impl fmt::Display for DiskCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tiles, {}", self.files, format_size(self.bytes))?;
        if let Some(average) = self.average_tile_bytes() {
            write!(f, " ({} per tile)", format_size(average))?;
        }
        Ok(())
    }
}

/// Count the tiles in `dir`.
///
/// Only regular files with the tile extension are counted, so stray
/// temporary files from interrupted writes are ignored. A missing directory
/// is an empty cache.
pub fn disk_cache_stats(dir: &Path) -> io::Result<DiskCacheStats> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DiskCacheStats::default()),
        Err(e) => return Err(e),
    };

    let mut stats = DiskCacheStats::default();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(TILE_EXTENSION) {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            stats.files += 1;
            stats.bytes += metadata.len();
        }
    }

    Ok(stats)
}

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Byte count scaled to the largest binary unit that keeps it at least 1.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, SIZE_UNITS[0])
    } else {
        format!("{:.2} {}", value, SIZE_UNITS[unit])
    }
}
