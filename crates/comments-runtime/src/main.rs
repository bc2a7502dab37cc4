//! # Comments Runtime
//!
//! Entry point of the comment stream processor.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr) and the metrics registry
//! 2. Load configuration from the environment
//! 3. Wire the event bus, store and service
//! 4. Reset the store (unless `COMMENTS_RESET_ON_STARTUP=false`)
//! 5. Bind stdin to the input channel and stdout to the output channel
//!
//! The process exits after end of input or on Ctrl+C, once every comment
//! read so far has been written out.

use anyhow::{Context, Result};
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

use comments_runtime::{CommentRuntime, RuntimeConfig, ServiceContainer};
use stream_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = init_telemetry(&TelemetryConfig::from_env())
        .context("failed to initialize telemetry")?;
    let config = RuntimeConfig::from_env().context("invalid configuration")?;

    info!(
        service = %config.telemetry.service_name,
        version = env!("CARGO_PKG_VERSION"),
        store = config.storage.backend.as_str(),
        "Comment stream processor starting"
    );

    let container = ServiceContainer::new(config, telemetry.metrics())
        .context("failed to wire service container")?;
    let mut runtime = CommentRuntime::new(container);
    runtime.start(BufReader::new(stdin()), stdout()).await?;

    let interrupted = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("Ctrl+C received");
            true
        }
        stats = runtime.wait_for_source() => {
            info!(?stats, "Input exhausted");
            false
        }
    };

    let report = runtime.shutdown().await;
    info!(
        forwarded = report.adapter.forwarded,
        failed = report.adapter.failed,
        "Comment stream processor stopped"
    );

    drop(telemetry);

    if interrupted {
        // A pending stdin read cannot be cancelled and would block runtime shutdown
        std::process::exit(0);
    }
    Ok(())
}
