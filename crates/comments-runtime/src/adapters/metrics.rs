//! Prometheus implementation of the service's `MetricsRecorder` port.

use comments_service::MetricsRecorder;
use shared_types::ImageId;
use std::sync::Arc;
use std::time::Duration;
use stream_telemetry::MetricsRegistry;

/// Records service metrics into the shared Prometheus registry.
pub struct PrometheusMetrics {
    registry: Arc<MetricsRegistry>,
}

impl PrometheusMetrics {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    /// The registry backing this recorder.
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn record_comment_consumed(&self, image_id: &ImageId) {
        self.registry.record_consumed(image_id.as_str());
    }

    fn record_save_failure(&self) {
        self.registry.record_save_failure();
    }

    fn record_save_duration(&self, duration: Duration) {
        self.registry.observe_save_duration(duration);
    }

    fn record_published(&self, topic: &str) {
        self.registry.record_published(topic);
    }
}
