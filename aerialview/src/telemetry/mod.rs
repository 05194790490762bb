//! Fetch telemetry for observability.
//!
//! This module provides lock-free counters for the tile fetch path with
//! minimal overhead, and a point-in-time snapshot for display.
//!
//! # Architecture
//!
//! ```text
//! Tile Cache / Assembler ─────► FetchMetrics ─────► TelemetrySnapshot ─────► Views
//!                               (atomic counters)   (point-in-time copy)      (CLI, logs)
//! ```
//!
//! # Example
//!
//! ```
//! use aerialview::telemetry::FetchMetrics;
//!
//! let metrics = FetchMetrics::new();
//! metrics.disk_hit();
//! metrics.network_fetch(20_000);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.tiles_resolved(), 2);
//! assert!((snapshot.disk_hit_ratio() - 0.5).abs() < 1e-9);
//! ```

mod metrics;
mod snapshot;

pub use metrics::FetchMetrics;
pub use snapshot::TelemetrySnapshot;
