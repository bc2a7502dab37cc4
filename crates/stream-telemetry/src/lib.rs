//! # Stream Telemetry
//!
//! Observability for the comment stream processor.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an env filter, pretty or JSON output on stderr
//! - **Metrics**: a Prometheus registry holding the `comments.consumed` counter
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stream_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let guard = init_telemetry(&TelemetryConfig::from_env())?;
//! guard.metrics().record_consumed("img-1");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CS_SERVICE_NAME` | `comments` | Service name in logs |
//! | `CS_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CS_JSON_LOGS` | `false` | JSON log lines (defaults to true in containers) |
//! | `CS_ANSI` | `true` | Colored output for pretty logs |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{MetricsRegistry, COMMENTS_CONSUMED, IMAGE_ID_LABEL};

use std::sync::Arc;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and the metrics registry.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so that a logging failure still reports through stderr
    let metrics = Arc::new(MetricsRegistry::new()?);
    let logging = init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    metrics: Arc<MetricsRegistry>,
}

impl TelemetryGuard {
    /// Shared handle to the metrics registry.
    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        match self.metrics.encode() {
            Ok(text) => tracing::debug!(metrics = %text, "Final metrics snapshot"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode final metrics"),
        }
        tracing::info!("Shutting down telemetry...");
    }
}
