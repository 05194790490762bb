//! Disk-first tile resolution with network fallback.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::{ImageFormat, RgbImage};
use tracing::{debug, warn};

use super::{CacheKeyScheme, TileError, TileStore};
use crate::provider::{HttpClient, ProviderError, RetryPolicy};
use crate::telemetry::FetchMetrics;

/// Where a resolved tile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSource {
    /// Read from the tile store.
    Disk,
    /// Downloaded from the tile server and written to the store.
    Network,
}

/// A decoded tile and its origin.
#[derive(Debug, Clone)]
pub struct ResolvedTile {
    /// The tile as RGB8.
    pub image: RgbImage,
    /// Where it came from.
    pub source: TileSource,
}

/// Resolves tile URLs to decoded images.
///
/// A tile present in the store is returned as-is without contacting the
/// server. Otherwise the tile is downloaded, retrying transport failures per
/// the [`RetryPolicy`], decoded to RGB, persisted as PNG and returned.
///
/// # Example
///
/// ```ignore
/// let client = TileCacheClient::new(ReqwestClient::new()?, DiskTileStore::new(dir))
///     .with_retry_policy(RetryPolicy::exponential(3, Duration::from_millis(100)));
/// let tile = client.resolve("https://tile.example/18/1/2.png").await?;
/// ```
pub struct TileCacheClient<C, S> {
    http: C,
    store: S,
    retry_policy: RetryPolicy,
    key_scheme: CacheKeyScheme,
    metrics: Arc<FetchMetrics>,
}

impl<C: HttpClient, S: TileStore> TileCacheClient<C, S> {
    /// Create a client with no retries and the default key scheme.
    pub fn new(http: C, store: S) -> Self {
        Self {
            http,
            store,
            retry_policy: RetryPolicy::None,
            key_scheme: CacheKeyScheme::default(),
            metrics: Arc::new(FetchMetrics::new()),
        }
    }

    /// Set the retry policy for transport failures.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set how URLs map to cache keys.
    pub fn with_key_scheme(mut self, scheme: CacheKeyScheme) -> Self {
        self.key_scheme = scheme;
        self
    }

    /// Record into a shared set of counters.
    pub fn with_metrics(mut self, metrics: Arc<FetchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The counters this client records into.
    pub fn metrics(&self) -> &Arc<FetchMetrics> {
        &self.metrics
    }

    /// The underlying tile store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cache key for a URL.
    pub fn cache_key(&self, url: &str) -> String {
        self.key_scheme.key_for(url)
    }

    /// Resolve a tile, from the store if present, else from the network.
    pub async fn resolve(&self, url: &str) -> Result<RgbImage, TileError> {
        self.resolve_with_source(url).await.map(|t| t.image)
    }

    /// Like [`resolve`](Self::resolve) but also reports where the tile came from.
    pub async fn resolve_with_source(&self, url: &str) -> Result<ResolvedTile, TileError> {
        if let Some(image) = self.lookup(url).await {
            return Ok(ResolvedTile {
                image,
                source: TileSource::Disk,
            });
        }

        self.fetch_and_store(url).await.map(|image| ResolvedTile {
            image,
            source: TileSource::Network,
        })
    }

    /// Look a tile up in the store without touching the network.
    ///
    /// Unreadable or undecodable entries are logged and reported as misses
    /// so the caller refetches and overwrites them.
    pub async fn lookup(&self, url: &str) -> Option<RgbImage> {
        let key = self.cache_key(url);

        let data = match self.store.load(&key).await {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                warn!(url = %url, key = %key, error = %e, "Cached tile unreadable, refetching");
                return None;
            }
        };

        match image::load_from_memory_with_format(&data, ImageFormat::Png) {
            Ok(img) => {
                self.metrics.disk_hit();
                debug!(url = %url, "Tile served from cache");
                Some(img.to_rgb8())
            }
            Err(e) => {
                warn!(url = %url, key = %key, error = %e, "Cached tile corrupt, refetching");
                None
            }
        }
    }

    /// Download a tile, decode it and write it to the store.
    ///
    /// A failed store write is logged; the decoded tile is still returned.
    pub async fn fetch_and_store(&self, url: &str) -> Result<RgbImage, TileError> {
        let result = self.fetch_decoded(url).await;

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                if e.is_not_found() {
                    self.metrics.not_found();
                    debug!(url = %url, error = %e, "Tile not available");
                } else {
                    self.metrics.failure();
                    warn!(url = %url, error = %e, "Tile fetch failed");
                }
                return Err(e);
            }
        };

        let key = self.cache_key(url);
        match encode_png(&image) {
            Ok(png) => {
                if let Err(e) = self.store.store(&key, png).await {
                    warn!(url = %url, key = %key, error = %e, "Failed to cache tile");
                }
            }
            Err(e) => warn!(url = %url, error = %e, "Failed to encode tile for cache"),
        }

        Ok(image)
    }

    async fn fetch_decoded(&self, url: &str) -> Result<RgbImage, TileError> {
        let body = self.fetch_with_retry(url).await?;

        if body.is_empty() {
            return Err(TileError::EmptyResponse {
                url: url.to_string(),
            });
        }
        self.metrics.network_fetch(body.len() as u64);

        image::load_from_memory(&body)
            .map(|img| img.to_rgb8())
            .map_err(|e| TileError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<Bytes, TileError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let error = match self.http.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            match error {
                ProviderError::NotFound(_) => {
                    return Err(TileError::NotFound {
                        url: url.to_string(),
                    })
                }
                ProviderError::HttpStatus { status, .. } => {
                    return Err(TileError::Http {
                        url: url.to_string(),
                        status,
                    })
                }
                e if e.is_transient() => match self.retry_policy.delay_for_attempt(attempt) {
                    Some(delay) => {
                        self.metrics.retry();
                        debug!(
                            url = %url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying tile fetch"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    None => {
                        return Err(TileError::Fetch {
                            url: url.to_string(),
                            attempts: attempt,
                            reason: e.to_string(),
                        })
                    }
                },
                e => {
                    return Err(TileError::Fetch {
                        url: url.to_string(),
                        attempts: attempt,
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

/// Encode an RGB tile as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, TileError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| TileError::Encode(e.to_string()))?;
    Ok(buf)
}
