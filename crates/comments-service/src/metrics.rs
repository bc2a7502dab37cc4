//! Metrics hooks for comment ingestion
//!
//! The service reports through `MetricsRecorder`; the runtime plugs in a
//! Prometheus-backed recorder, tests use the in-process `Metrics`.
//!
//! ## Usage
//!
//! ```ignore
//! use comments_service::metrics::{Metrics, MetricsRecorder};
//!
//! let metrics = Metrics::new();
//! metrics.record_comment_consumed(&"img-1".into());
//! assert_eq!(metrics.consumed("img-1"), 1);
//! ```

use parking_lot::RwLock;
use shared_types::ImageId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trait for metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus or StatsD.
pub trait MetricsRecorder: Send + Sync {
    /// Increment the `comments.consumed` counter tagged with `imageId`
    fn record_comment_consumed(&self, image_id: &ImageId);

    /// Record a comment that could not be persisted
    fn record_save_failure(&self);

    /// Record the time a single save took
    fn record_save_duration(&self, duration: Duration);

    /// Record a message published to the bus on `topic`
    fn record_published(&self, topic: &str);
}

/// In-process metrics collector
///
/// Thread-safe per-image counters plus totals.
#[derive(Default)]
pub struct Metrics {
    /// `comments.consumed` by image
    consumed: RwLock<HashMap<ImageId, u64>>,
    /// Published messages by topic
    published: RwLock<HashMap<String, u64>>,
    /// Total save failures
    pub save_failures: AtomicU64,
    /// Cumulative save time in nanoseconds
    pub save_time_ns: AtomicU64,
    /// Number of timed saves
    pub saves_timed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `comments.consumed` value for an image
    pub fn consumed(&self, image_id: &str) -> u64 {
        self.consumed
            .read()
            .get(&ImageId(image_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Current published count for a topic
    pub fn published(&self, topic: &str) -> u64 {
        self.published.read().get(topic).copied().unwrap_or(0)
    }

    /// Average save time in nanoseconds
    pub fn avg_save_time_ns(&self) -> u64 {
        let total = self.save_time_ns.load(Ordering::Relaxed);
        let count = self.saves_timed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let consumed = self.consumed.read().clone();
        MetricsSnapshot {
            total_consumed: consumed.values().sum(),
            consumed_by_image: consumed,
            save_failures: self.save_failures.load(Ordering::Relaxed),
            avg_save_ns: self.avg_save_time_ns(),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.consumed.write().clear();
        self.published.write().clear();
        self.save_failures.store(0, Ordering::Relaxed);
        self.save_time_ns.store(0, Ordering::Relaxed);
        self.saves_timed.store(0, Ordering::Relaxed);
    }
}

impl MetricsRecorder for Metrics {
    fn record_comment_consumed(&self, image_id: &ImageId) {
        *self.consumed.write().entry(image_id.clone()).or_insert(0) += 1;
    }

    fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_save_duration(&self, duration: Duration) {
        self.saves_timed.fetch_add(1, Ordering::Relaxed);
        self.save_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn record_published(&self, topic: &str) {
        *self.published.write().entry(topic.to_string()).or_insert(0) += 1;
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub consumed_by_image: HashMap<ImageId, u64>,
    pub total_consumed: u64,
    pub save_failures: u64,
    pub avg_save_ns: u64,
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_comment_consumed(&self, _: &ImageId) {}
    fn record_save_failure(&self) {}
    fn record_save_duration(&self, _: Duration) {}
    fn record_published(&self, _: &str) {}
}
