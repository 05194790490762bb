//! Concurrent tile fetch and mosaic assembly.

use std::fmt;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use image::RgbImage;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::{BoundingBox, Canvas};
use crate::cache::{ResolvedTile, TileCacheClient, TileError, TileSource, TileStore};
use crate::coord::TileCoord;
use crate::provider::{HttpClient, UrlTemplate};

/// Default number of tile fetches in flight.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Errors from grid assembly.
#[derive(Debug, Error)]
pub enum GridError {
    /// No tile in the bounding box could be resolved.
    #[error("All {tiles} tiles failed ({not_found} not found, {timed_out} timed out)")]
    AllTilesFailed {
        tiles: usize,
        not_found: usize,
        timed_out: usize,
    },

    /// A tile failed with an error other than "not found".
    ///
    /// Fetching stops at the first such tile.
    #[error("Tile {}/{}/{} failed: {source}", tile.zoom, tile.x, tile.y)]
    TileFailed {
        tile: TileCoord,
        #[source]
        source: TileError,
    },
}

/// Per-request tally of tile outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Tiles in the bounding box.
    pub requested: usize,
    /// Tiles pasted into the canvas.
    pub resolved: usize,
    /// Of the resolved tiles, how many came from the tile store.
    pub from_disk: usize,
    /// Tiles the server does not have, including rows past the poles.
    pub not_found: usize,
    /// Tiles abandoned when the request deadline expired.
    pub timed_out: usize,
}

impl AssemblyReport {
    /// Tiles left blank in the canvas.
    pub fn missing(&self) -> usize {
        self.requested - self.resolved
    }

    /// Whether every requested tile was pasted.
    pub fn is_complete(&self) -> bool {
        self.resolved == self.requested
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} tiles ({} cached, {} not found, {} timed out)",
            self.resolved,
            self.requested,
            self.from_disk,
            self.not_found,
            self.timed_out
        )
    }
}

/// An assembled mosaic.
#[derive(Debug)]
pub struct AssembledGrid {
    /// The mosaic covering the bounding box.
    pub image: RgbImage,
    /// Pixel size of one tile cell.
    pub tile_size: (u32, u32),
    /// Outcome tally.
    pub report: AssemblyReport,
}

/// Fetches every tile in a bounding box and pastes them into a canvas.
///
/// At most `concurrency` tiles are resolved at once. When
/// `cache_hits_bypass_limiter` is set, tiles already in the store are read
/// without waiting for a permit, so a warm cache is not throttled by the
/// network limit. Results are collected by a single fan-in loop, which is
/// the only writer to the canvas.
#[derive(Debug, Clone)]
pub struct GridAssembler {
    concurrency: usize,
    cache_hits_bypass_limiter: bool,
    deadline: Option<Duration>,
    tile_size: Option<u32>,
}

impl Default for GridAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl GridAssembler {
    /// Create an assembler with at most `concurrency` fetches in flight.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            cache_hits_bypass_limiter: true,
            deadline: None,
            tile_size: None,
        }
    }

    /// Whether store hits skip the concurrency limit.
    pub fn with_cache_hits_bypass_limiter(mut self, bypass: bool) -> Self {
        self.cache_hits_bypass_limiter = bypass;
        self
    }

    /// Abandon tiles still pending after `deadline`.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Paste tiles at this edge length, resampling tiles of other sizes.
    ///
    /// Without it the first resolved tile sets the cell size.
    pub fn with_tile_size(mut self, tile_size: Option<u32>) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Maximum fetches in flight.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve every tile in `bbox` and assemble the mosaic.
    ///
    /// Columns west of 0 or east of the last column are fetched from the
    /// other side of the antimeridian. Tiles the server does not have and rows
    /// past the poles leave black cells.
    ///
    /// # Errors
    ///
    /// - [`GridError::TileFailed`] on the first tile that fails for any reason
    ///   other than "not found"; the remaining fetches are dropped
    /// - [`GridError::AllTilesFailed`] when nothing could be pasted
    pub async fn assemble<C, S>(
        &self,
        client: &TileCacheClient<C, S>,
        template: &UrlTemplate,
        bbox: &BoundingBox,
        zoom: u8,
    ) -> Result<AssembledGrid, GridError>
    where
        C: HttpClient,
        S: TileStore,
    {
        let started = Instant::now();
        let tiles = bbox.tiles(zoom);
        let mut report = AssemblyReport {
            requested: tiles.len(),
            ..Default::default()
        };
        let mut canvas = Canvas::new(bbox.columns(), bbox.rows());
        if let Some(size) = self.tile_size {
            canvas = canvas.with_cell_size(size, size);
        }

        let semaphore = Semaphore::new(self.concurrency);
        let semaphore = &semaphore;

        let mut pending = FuturesUnordered::new();
        for tile in tiles {
            let Some(on_grid) = tile.wrapped() else {
                report.not_found += 1;
                debug!(
                    x = tile.x,
                    y = tile.y,
                    zoom = tile.zoom,
                    "Tile past the pole, leaving blank"
                );
                continue;
            };
            let url = template.url(&on_grid);
            pending.push(async move {
                let result = self.resolve_one(client, &url, semaphore).await;
                (tile, result)
            });
        }

        debug!(
            tiles = report.requested,
            concurrency = self.concurrency,
            "Fetching tile grid"
        );

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        while !pending.is_empty() {
            tokio::select! {
                biased;

                Some((tile, result)) = pending.next() => {
                    if let Err(source) = Self::record(bbox, &mut canvas, &mut report, tile, result) {
                        warn!(
                            x = tile.x,
                            y = tile.y,
                            zoom = tile.zoom,
                            abandoned = pending.len(),
                            error = %source,
                            "Tile failed, aborting grid"
                        );
                        return Err(GridError::TileFailed { tile, source });
                    }
                }

                _ = &mut expiry => {
                    report.timed_out = pending.len();
                    warn!(
                        abandoned = report.timed_out,
                        resolved = report.resolved,
                        "Request deadline expired, using tiles received so far"
                    );
                    break;
                }
            }
        }

        let tile_size = canvas.tile_dimensions();
        let (image, tile_size) = match (canvas.into_image(), tile_size) {
            (Some(image), Some(tile_size)) => (image, tile_size),
            _ => {
                warn!(tiles = report.requested, "No tile could be resolved");
                return Err(GridError::AllTilesFailed {
                    tiles: report.requested,
                    not_found: report.not_found,
                    timed_out: report.timed_out,
                });
            }
        };

        info!(
            resolved = report.resolved,
            requested = report.requested,
            from_disk = report.from_disk,
            not_found = report.not_found,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tile grid assembled"
        );

        Ok(AssembledGrid {
            image,
            tile_size,
            report,
        })
    }

    async fn resolve_one<C, S>(
        &self,
        client: &TileCacheClient<C, S>,
        url: &str,
        semaphore: &Semaphore,
    ) -> Result<ResolvedTile, TileError>
    where
        C: HttpClient,
        S: TileStore,
    {
        if self.cache_hits_bypass_limiter {
            if let Some(image) = client.lookup(url).await {
                return Ok(ResolvedTile {
                    image,
                    source: TileSource::Disk,
                });
            }
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| TileError::Task(e.to_string()))?;
            return client.fetch_and_store(url).await.map(|image| ResolvedTile {
                image,
                source: TileSource::Network,
            });
        }

        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| TileError::Task(e.to_string()))?;
        client.resolve_with_source(url).await
    }

    /// Paste a resolved tile or absorb a missing one.
    ///
    /// Any other failure is handed back to the caller.
    fn record(
        bbox: &BoundingBox,
        canvas: &mut Canvas,
        report: &mut AssemblyReport,
        tile: TileCoord,
        result: Result<ResolvedTile, TileError>,
    ) -> Result<(), TileError> {
        match result {
            Ok(resolved) => {
                if let Some((column, row)) = bbox.offset_of(&tile) {
                    canvas.paste(column, row, &resolved.image);
                    report.resolved += 1;
                    if resolved.source == TileSource::Disk {
                        report.from_disk += 1;
                    }
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                report.not_found += 1;
                debug!(x = tile.x, y = tile.y, zoom = tile.zoom, "Tile missing, leaving blank");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{encode_png, MemoryTileStore};
    use crate::provider::{MockHttpClient, ProviderError};
    use bytes::Bytes;
    use image::Rgb;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TEMPLATE: &str = "https://tile.example/{z}/{x}/{y}.png";

    fn template() -> UrlTemplate {
        UrlTemplate::new(TEMPLATE).unwrap()
    }

    fn parse_xy(url: &str) -> (u8, u8) {
        let parts: Vec<&str> = url.trim_end_matches(".png").rsplit('/').collect();
        (parts[1].parse().unwrap(), parts[0].parse().unwrap())
    }

    /// Tile whose colour encodes its own (x, y).
    fn coloured_tiles() -> MockHttpClient {
        MockHttpClient::new(|url| {
            let (x, y) = parse_xy(url);
            let tile = image::RgbImage::from_pixel(8, 8, Rgb([x, y, 99]));
            Ok(Bytes::from(encode_png(&tile).unwrap()))
        })
    }

    fn small_box() -> BoundingBox {
        BoundingBox {
            min_x: 10,
            min_y: 20,
            max_x: 13,
            max_y: 22,
        }
    }

    #[tokio::test]
    async fn test_assembles_tiles_at_offsets() {
        let client = TileCacheClient::new(coloured_tiles(), MemoryTileStore::new());
        let grid = GridAssembler::new(2)
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();

        assert_eq!(grid.image.dimensions(), (24, 16));
        assert_eq!(grid.tile_size, (8, 8));
        assert!(grid.report.is_complete());
        assert_eq!(grid.image.get_pixel(0, 0), &Rgb([10, 20, 99]));
        assert_eq!(grid.image.get_pixel(17, 9), &Rgb([12, 21, 99]));
    }

    #[tokio::test]
    async fn test_not_found_tiles_stay_black() {
        let http = MockHttpClient::new(|url| {
            let (x, y) = parse_xy(url);
            if x == 11 {
                return Err(ProviderError::NotFound(url.to_string()));
            }
            let tile = image::RgbImage::from_pixel(8, 8, Rgb([x, y, 1]));
            Ok(Bytes::from(encode_png(&tile).unwrap()))
        });
        let client = TileCacheClient::new(http, MemoryTileStore::new());

        let grid = GridAssembler::default()
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();

        assert_eq!(grid.report.not_found, 2);
        assert_eq!(grid.report.resolved, 4);
        assert_eq!(grid.report.missing(), 2);
        assert_eq!(grid.image.get_pixel(12, 4), &Rgb([0, 0, 0]));
        assert_eq!(grid.image.get_pixel(20, 4), &Rgb([12, 20, 1]));
    }

    #[tokio::test]
    async fn test_all_not_found() {
        let http = MockHttpClient::fixed(Err(ProviderError::NotFound(String::new())));
        let client = TileCacheClient::new(http, MemoryTileStore::new());

        let err = GridAssembler::default()
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GridError::AllTilesFailed {
                tiles: 6,
                not_found: 6,
                timed_out: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_grid() {
        let http = MockHttpClient::new(|url| {
            let (x, y) = parse_xy(url);
            if (x, y) == (12, 21) {
                return Err(ProviderError::Transport("connection refused".into()));
            }
            let tile = image::RgbImage::from_pixel(8, 8, Rgb([x, y, 1]));
            Ok(Bytes::from(encode_png(&tile).unwrap()))
        });
        let client = TileCacheClient::new(http, MemoryTileStore::new());

        let err = GridAssembler::new(1)
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap_err();

        match err {
            GridError::TileFailed { tile, source } => {
                assert_eq!(tile, TileCoord::new(12, 21, 5));
                assert!(matches!(source, TileError::Fetch { attempts: 1, .. }));
            }
            other => panic!("expected TileFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_aborts_grid() {
        let http = MockHttpClient::fixed(Err(ProviderError::HttpStatus {
            status: 500,
            url: String::new(),
        }));
        let client = TileCacheClient::new(http, MemoryTileStore::new());

        let err = GridAssembler::default()
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GridError::TileFailed {
                source: TileError::Http { status: 500, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_columns_wrap_across_antimeridian() {
        let http = Arc::new(coloured_tiles());
        let client = TileCacheClient::new(Arc::clone(&http), MemoryTileStore::new());
        let bbox = BoundingBox {
            min_x: -2,
            min_y: 4,
            max_x: 2,
            max_y: 5,
        };

        let grid = GridAssembler::default()
            .assemble(&client, &template(), &bbox, 5)
            .await
            .unwrap();

        assert!(grid.report.is_complete());
        assert_eq!(grid.image.get_pixel(0, 0), &Rgb([30, 4, 99]));
        assert_eq!(grid.image.get_pixel(8, 0), &Rgb([31, 4, 99]));
        assert_eq!(grid.image.get_pixel(16, 0), &Rgb([0, 4, 99]));
        assert_eq!(grid.image.get_pixel(24, 0), &Rgb([1, 4, 99]));
        assert_eq!(http.calls(), 4);
    }

    #[tokio::test]
    async fn test_rows_past_pole_skip_network() {
        let http = Arc::new(coloured_tiles());
        let client = TileCacheClient::new(Arc::clone(&http), MemoryTileStore::new());
        let bbox = BoundingBox {
            min_x: 3,
            min_y: -2,
            max_x: 5,
            max_y: 1,
        };

        let grid = GridAssembler::default()
            .assemble(&client, &template(), &bbox, 5)
            .await
            .unwrap();

        assert_eq!(grid.report.requested, 6);
        assert_eq!(grid.report.not_found, 4);
        assert_eq!(grid.report.resolved, 2);
        assert_eq!(http.calls(), 2);
        assert_eq!(grid.image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(grid.image.get_pixel(8, 16), &Rgb([4, 0, 99]));
    }

    #[tokio::test]
    async fn test_second_pass_served_from_store() {
        let http = Arc::new(coloured_tiles());
        let client = TileCacheClient::new(Arc::clone(&http), MemoryTileStore::new());
        let assembler = GridAssembler::default();

        let first = assembler
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();
        let second = assembler
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();

        assert_eq!(http.calls(), 6);
        assert_eq!(second.report.from_disk, 6);
        assert_eq!(first.image, second.image);
    }

    #[tokio::test]
    async fn test_concurrency_limit_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        struct Gauge {
            in_flight: Arc<AtomicUsize>,
            peak: Arc<AtomicUsize>,
        }

        impl HttpClient for Gauge {
            async fn get(&self, _url: &str) -> Result<Bytes, ProviderError> {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                let tile = image::RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]));
                Ok(Bytes::from(encode_png(&tile).unwrap()))
            }
        }

        let http = Gauge {
            in_flight: Arc::clone(&in_flight),
            peak: Arc::clone(&peak),
        };
        let client = TileCacheClient::new(http, MemoryTileStore::new());
        let bbox = BoundingBox {
            min_x: 0,
            min_y: 0,
            max_x: 4,
            max_y: 4,
        };

        let grid = GridAssembler::new(3)
            .assemble(&client, &template(), &bbox, 4)
            .await
            .unwrap();

        assert!(grid.report.is_complete());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_deadline_abandons_slow_tiles() {
        struct Slow;

        impl HttpClient for Slow {
            async fn get(&self, url: &str) -> Result<Bytes, ProviderError> {
                if url.contains("/10/20.png") {
                    let tile = image::RgbImage::from_pixel(2, 2, Rgb([5, 5, 5]));
                    return Ok(Bytes::from(encode_png(&tile).unwrap()));
                }
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(ProviderError::Transport("too slow".into()))
            }
        }

        let client = TileCacheClient::new(Slow, MemoryTileStore::new());
        let grid = GridAssembler::new(8)
            .with_deadline(Some(Duration::from_millis(200)))
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();

        assert_eq!(grid.report.resolved, 1);
        assert_eq!(grid.report.timed_out, 5);
        assert_eq!(grid.image.get_pixel(0, 0), &Rgb([5, 5, 5]));
    }

    #[tokio::test]
    async fn test_fixed_tile_size_resamples() {
        let client = TileCacheClient::new(coloured_tiles(), MemoryTileStore::new());
        let grid = GridAssembler::default()
            .with_tile_size(Some(4))
            .assemble(&client, &template(), &small_box(), 5)
            .await
            .unwrap();

        assert_eq!(grid.tile_size, (4, 4));
        assert_eq!(grid.image.dimensions(), (12, 8));
        assert_eq!(grid.image.get_pixel(9, 5), &Rgb([12, 21, 99]));
    }

    #[test]
    fn test_report_display() {
        let report = AssemblyReport {
            requested: 121,
            resolved: 119,
            from_disk: 100,
            not_found: 2,
            timed_out: 0,
        };
        assert_eq!(
            report.to_string(),
            "119/121 tiles (100 cached, 2 not found, 0 timed out)"
        );
    }
}
