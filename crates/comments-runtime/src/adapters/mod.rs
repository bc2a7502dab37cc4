//! # Runtime Adapters
//!
//! - `metrics` - `MetricsRecorder` over the Prometheus registry
//! - `binder` - stdin/stdout bindings for the input and output channels
//! - `storage` - persistent `CommentRepository` backends (feature-gated)

pub mod binder;
pub mod metrics;
pub mod storage;

pub use binder::{BinderError, BinderSink, BinderSource, SinkStats, SourceStats};
pub use metrics::PrometheusMetrics;
