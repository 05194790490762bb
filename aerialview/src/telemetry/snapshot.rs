//! Point-in-time telemetry snapshot.

use std::fmt;
use std::time::Duration;

/// Copy of the [`FetchMetrics`](super::FetchMetrics) counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Tiles served from the disk cache.
    pub disk_hits: u64,
    /// Tiles downloaded from the tile server.
    pub network_fetches: u64,
    /// Total body bytes downloaded.
    pub bytes_downloaded: u64,
    /// Retries after transient failures.
    pub retries: u64,
    /// Tiles the server did not have.
    pub not_found: u64,
    /// Tiles that failed for any other reason.
    pub failures: u64,
    /// Camera views produced.
    pub views_rendered: u64,
    /// Camera view requests that failed.
    pub views_failed: u64,
    /// Total time spent producing views.
    pub render_time: Duration,
}

impl TelemetrySnapshot {
    /// Tiles successfully resolved from any source.
    pub fn tiles_resolved(&self) -> u64 {
        self.disk_hits + self.network_fetches
    }

    /// Fraction of resolved tiles served from disk, `0.0` when none resolved.
    pub fn disk_hit_ratio(&self) -> f64 {
        let resolved = self.tiles_resolved();
        if resolved == 0 {
            0.0
        } else {
            self.disk_hits as f64 / resolved as f64
        }
    }

    /// Mean time per rendered view.
    pub fn average_render_time(&self) -> Option<Duration> {
        if self.views_rendered == 0 {
            None
        } else {
            Some(self.render_time / self.views_rendered as u32)
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "views: {} ok / {} failed, tiles: {} disk / {} network ({:.1}% hit), \
             {} retries, {} not found, {} failed, {} bytes downloaded",
            self.views_rendered,
            self.views_failed,
            self.disk_hits,
            self.network_fetches,
            self.disk_hit_ratio() * 100.0,
            self.retries,
            self.not_found,
            self.failures,
            self.bytes_downloaded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_empty() {
        assert_eq!(TelemetrySnapshot::default().disk_hit_ratio(), 0.0);
        assert_eq!(TelemetrySnapshot::default().average_render_time(), None);
    }

    #[test]
    fn test_display_mentions_counts() {
        let snapshot = TelemetrySnapshot {
            disk_hits: 3,
            network_fetches: 1,
            views_rendered: 2,
            ..Default::default()
        };
        let text = snapshot.to_string();
        assert!(text.contains("3 disk"));
        assert!(text.contains("1 network"));
        assert!(text.contains("75.0% hit"));
    }
}
