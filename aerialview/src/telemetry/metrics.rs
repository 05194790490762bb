//! Atomic fetch counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::TelemetrySnapshot;

/// Counters for tile resolution and view synthesis.
///
/// All methods take `&self` and use relaxed atomics, so a single instance can
/// be shared behind an `Arc` by every concurrent fetch.
#[derive(Debug, Default)]
pub struct FetchMetrics {
    disk_hits: AtomicU64,
    network_fetches: AtomicU64,
    bytes_downloaded: AtomicU64,
    retries: AtomicU64,
    not_found: AtomicU64,
    failures: AtomicU64,
    views_rendered: AtomicU64,
    views_failed: AtomicU64,
    render_time_us: AtomicU64,
}

impl FetchMetrics {
    /// Create a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tile was served from the disk cache.
    pub fn disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A tile was downloaded.
    pub fn network_fetch(&self, bytes: u64) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// A transient failure is being retried.
    pub fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// The server had no tile (404 or empty body).
    pub fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// A tile failed for any other reason.
    pub fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A camera view was produced.
    pub fn view_rendered(&self, elapsed: Duration) {
        self.views_rendered.fetch_add(1, Ordering::Relaxed);
        self.render_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// A camera view request failed.
    pub fn view_failed(&self) {
        self.views_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            views_rendered: self.views_rendered.load(Ordering::Relaxed),
            views_failed: self.views_failed.load(Ordering::Relaxed),
            render_time: Duration::from_micros(self.render_time_us.load(Ordering::Relaxed)),
        }
    }
}
