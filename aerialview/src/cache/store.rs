//! Persistent storage for encoded tiles.
//!
//! The [`TileStore`] trait is the seam between the resolving client and the
//! filesystem. [`DiskTileStore`] keeps one PNG per key in a flat directory;
//! [`MemoryTileStore`] backs tests and ephemeral sessions.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::TileError;

/// File extension for cached tiles.
pub const TILE_EXTENSION: &str = "png";

/// Key-addressed storage of PNG-encoded tiles.
///
/// Entries never expire. A present entry is authoritative.
pub trait TileStore: Send + Sync {
    /// Load the encoded tile stored under `key`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing is stored, `Ok(Some(bytes))` on a hit.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, TileError>> + Send;

    /// Store an encoded tile under `key`, replacing any previous entry.
    fn store(&self, key: &str, png: Vec<u8>) -> impl Future<Output = Result<(), TileError>> + Send;
}

impl<S: TileStore> TileStore for Arc<S> {
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, TileError>> + Send {
        (**self).load(key)
    }

    fn store(&self, key: &str, png: Vec<u8>) -> impl Future<Output = Result<(), TileError>> + Send {
        (**self).store(key, png)
    }
}

/// Flat directory of `<key>.png` files.
///
/// Reads and writes run on tokio's blocking pool. Writes go to a temporary
/// file in the same directory and are renamed into place, so concurrent
/// readers never observe a partially written tile. The directory is created
/// on first write.
#[derive(Debug, Clone)]
pub struct DiskTileStore {
    dir: PathBuf,
}

impl DiskTileStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, TILE_EXTENSION))
    }
}

impl TileStore for DiskTileStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, TileError> {
        let path = self.path_for(key);

        tokio::task::spawn_blocking(move || match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TileError::Io { path, source }),
        })
        .await
        .map_err(|e| TileError::Task(e.to_string()))?
    }

    async fn store(&self, key: &str, png: Vec<u8>) -> Result<(), TileError> {
        let dir = self.dir.clone();
        let path = self.path_for(key);

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &png))
            .await
            .map_err(|e| TileError::Task(e.to_string()))?
    }
}

fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> Result<(), TileError> {
    let io_err = |source| TileError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(data).map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), bytes = data.len(), "Tile written to cache");
    Ok(())
}

/// In-memory store keyed by cache key.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryTileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tiles.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl TileStore for MemoryTileStore {
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, TileError>> + Send {
        let hit = self.entries.read().get(key).cloned();
        async move { Ok(hit) }
    }

    fn store(&self, key: &str, png: Vec<u8>) -> impl Future<Output = Result<(), TileError>> + Send {
        self.entries.write().insert(key.to_string(), png);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disk_store_miss_then_hit() {
        let temp = TempDir::new().unwrap();
        let store = DiskTileStore::new(temp.path());

        assert!(store.load("abc").await.unwrap().is_none());

        store.store("abc", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.load("abc").await.unwrap(), Some(vec![1, 2, 3]));
        assert!(temp.path().join("abc.png").exists());
    }

    #[tokio::test]
    async fn test_disk_store_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("tiles");
        let store = DiskTileStore::new(&dir);

        store.store("k", vec![7]).await.unwrap();
        assert!(dir.join("k.png").exists());
    }

    #[tokio::test]
    async fn test_disk_store_overwrite_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let store = DiskTileStore::new(temp.path());

        store.store("k", vec![1]).await.unwrap();
        store.store("k", vec![2, 2]).await.unwrap();

        assert_eq!(store.load("k").await.unwrap(), Some(vec![2, 2]));
        let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_path_for() {
        let store = DiskTileStore::new("/var/cache/aerialview");
        assert_eq!(
            store.path_for("httpsa1b2"),
            PathBuf::from("/var/cache/aerialview/httpsa1b2.png")
        );
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTileStore::new();
        assert!(store.is_empty());

        store.store("a", vec![1]).await.unwrap();
        assert!(store.contains("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("a").await.unwrap(), Some(vec![1]));
        assert_eq!(store.load("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_arc_store_shares_entries() {
        let store = Arc::new(MemoryTileStore::new());
        let shared = Arc::clone(&store);

        shared.store("x", vec![5]).await.unwrap();
        assert!(store.contains("x"));
    }
}
