//! Prometheus metrics for the comment stream processor.
//!
//! Dotted metric names are exposed with underscores and the `_total`
//! suffix for counters: `comments.consumed` becomes `comments_consumed_total`.
//!
//! ## Metric Types
//!
//! - **Counter**: `comments_consumed_total{imageId}`, `comments_save_failures_total`,
//!   `comments_bus_messages_published_total{topic}`
//! - **Histogram**: `comments_save_duration_seconds`

use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

use crate::TelemetryError;

/// Logical name of the per-image consumption counter.
pub const COMMENTS_CONSUMED: &str = "comments.consumed";

/// Tag key carrying the image identifier.
pub const IMAGE_ID_LABEL: &str = "imageId";

/// Registry plus handles to every metric the service records.
///
/// Each instance owns its own `Registry` so independent pipelines (and tests)
/// never share counters.
pub struct MetricsRegistry {
    registry: Registry,
    comments_consumed: CounterVec,
    messages_published: CounterVec,
    save_failures: Counter,
    save_duration: Histogram,
}

impl MetricsRegistry {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let comments_consumed = CounterVec::new(
            Opts::new(
                format!("{}_total", prometheus_name(COMMENTS_CONSUMED)),
                "Comments persisted and forwarded, by image",
            ),
            &[IMAGE_ID_LABEL],
        )
        .map_err(init_err)?;

        let messages_published = CounterVec::new(
            Opts::new(
                "comments_bus_messages_published_total",
                "Messages published to the event bus by the service",
            ),
            &["topic"],
        )
        .map_err(init_err)?;

        let save_failures = Counter::new(
            "comments_save_failures_total",
            "Comments that could not be persisted",
        )
        .map_err(init_err)?;

        let buckets = exponential_buckets(0.0001, 2.0, 14).map_err(init_err)?;
        let save_duration = Histogram::with_opts(
            HistogramOpts::new(
                "comments_save_duration_seconds",
                "Time spent persisting a comment",
            )
            .buckets(buckets),
        )
        .map_err(init_err)?;

        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(comments_consumed.clone()),
            Box::new(messages_published.clone()),
            Box::new(save_failures.clone()),
            Box::new(save_duration.clone()),
        ];
        for collector in collectors {
            registry.register(collector).map_err(init_err)?;
        }

        Ok(Self {
            registry,
            comments_consumed,
            messages_published,
            save_failures,
            save_duration,
        })
    }

    /// Increment `comments.consumed` for the given image.
    pub fn record_consumed(&self, image_id: &str) {
        self.comments_consumed.with_label_values(&[image_id]).inc();
    }

    /// Count a message published on `topic`.
    pub fn record_published(&self, topic: &str) {
        self.messages_published.with_label_values(&[topic]).inc();
    }

    pub fn record_save_failure(&self) {
        self.save_failures.inc();
    }

    pub fn observe_save_duration(&self, duration: Duration) {
        self.save_duration.observe(duration.as_secs_f64());
    }

    /// Current value of `comments.consumed` for an image.
    #[must_use]
    pub fn consumed_count(&self, image_id: &str) -> u64 {
        self.comments_consumed.with_label_values(&[image_id]).get() as u64
    }

    #[must_use]
    pub fn published_count(&self, topic: &str) -> u64 {
        self.messages_published.with_label_values(&[topic]).get() as u64
    }

    #[must_use]
    pub fn save_failures(&self) -> u64 {
        self.save_failures.get() as u64
    }

    /// Underlying registry, for exposition by an external server.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics as Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(init_err)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

fn prometheus_name(name: &str) -> String {
    name.replace('.', "_")
}

fn init_err(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}
