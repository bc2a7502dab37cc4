//! # Comment Runtime
//!
//! Task supervision for the comment pipeline.
//!
//! ## Startup
//!
//! 1. Bind the input channel to the adapter, the output channel and the DLQ
//!    to the sink
//! 2. Reset the store (when enabled) and wait for it to finish
//! 3. Spawn the adapter, the sink and the source
//!
//! ## Shutdown
//!
//! 1. Stop the source
//! 2. Close the input channel; the adapter handles what is queued and ends
//! 3. Close the output channel and the DLQ; the sink writes what is queued
//!    and ends
//!
//! Every queue is bounded and publishing waits for room, so every comment
//! read before shutdown is written out.

use std::sync::Arc;

use anyhow::{Context, Result};
use comments_service::{AdapterStats, CommentBusAdapter, CommentIngestionApi};
use shared_bus::{EventPublisher, DLQ_CHANNEL};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::adapters::{BinderError, BinderSink, BinderSource, SinkStats, SourceStats};
use crate::container::ServiceContainer;

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RuntimeReport {
    /// Comments removed by the startup reset
    pub reset_removed: Option<u64>,
    pub source: Option<SourceStats>,
    pub adapter: AdapterStats,
    pub sink: Option<SinkStats>,
}

/// The comment stream processor.
pub struct CommentRuntime {
    container: Arc<ServiceContainer>,
    source_shutdown: watch::Sender<bool>,
    source_task: Option<JoinHandle<Result<SourceStats, BinderError>>>,
    adapter_task: Option<JoinHandle<AdapterStats>>,
    sink_task: Option<JoinHandle<Result<SinkStats, BinderError>>>,
    source_stats: Option<SourceStats>,
    reset_removed: Option<u64>,
}

impl CommentRuntime {
    pub fn new(container: ServiceContainer) -> Self {
        let (source_shutdown, _) = watch::channel(false);

        Self {
            container: Arc::new(container),
            source_shutdown,
            source_task: None,
            adapter_task: None,
            sink_task: None,
            source_stats: None,
            reset_removed: None,
        }
    }

    /// Shared access to the wired components.
    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    /// Start the pipeline reading from `reader` and writing to `writer`.
    pub async fn start<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let container = Arc::clone(&self.container);
        let bindings = &container.config.bindings;

        info!(
            input = %bindings.input_channel,
            output = %bindings.output_channel,
            "Starting comment pipeline"
        );

        let adapter = CommentBusAdapter::new(
            Arc::clone(&container.event_bus),
            Arc::clone(&container.service),
            Arc::clone(&container.metrics),
            bindings.input_channel.clone(),
            bindings.output_channel.clone(),
        )
        .context("failed to bind the input channel")?;
        let sink = BinderSink::new(
            &container.event_bus,
            bindings.output_channel.clone(),
            writer,
        )
        .context("failed to bind the output channel")?;

        if container.config.reset_on_startup {
            let removed = container
                .service
                .reset()
                .await
                .context("startup reset of the comment store failed")?;
            self.reset_removed = Some(removed);
        } else {
            info!("Startup reset disabled, keeping stored comments");
        }

        self.adapter_task = Some(tokio::spawn(adapter.run()));
        self.sink_task = Some(tokio::spawn(sink.run()));

        let source = BinderSource::new(
            reader,
            Arc::clone(&container.event_bus),
            bindings.input_channel.clone(),
        );
        self.source_task = Some(tokio::spawn(
            source.run(self.source_shutdown.subscribe()),
        ));

        info!("Comment pipeline running");
        Ok(())
    }

    /// Wait for the source to reach end of input.
    ///
    /// Safe to cancel: the source keeps running until `shutdown`.
    pub async fn wait_for_source(&mut self) -> Option<SourceStats> {
        let handle = self.source_task.as_mut()?;
        let outcome = handle.await;
        self.source_task = None;
        self.source_stats = join_binder("source", outcome);
        self.source_stats
    }

    /// Stop every task, handling queued events, and report.
    pub async fn shutdown(&mut self) -> RuntimeReport {
        info!("Initiating graceful shutdown...");
        let bus = &self.container.event_bus;
        let bindings = &self.container.config.bindings;

        let _ = self.source_shutdown.send(true);
        if let Some(handle) = self.source_task.take() {
            self.source_stats = join_binder("source", handle.await);
        }

        bus.close(&bindings.input_channel);
        let adapter = match self.adapter_task.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                error!(error = %e, "Adapter task failed");
                AdapterStats::default()
            }),
            None => AdapterStats::default(),
        };

        bus.close(&bindings.output_channel);
        bus.close(DLQ_CHANNEL);
        let sink = match self.sink_task.take() {
            Some(handle) => join_binder("sink", handle.await),
            None => None,
        };

        let report = RuntimeReport {
            reset_removed: self.reset_removed,
            source: self.source_stats,
            adapter,
            sink,
        };
        info!(
            ?report,
            events_published = self.container.event_bus.events_published(),
            "Shutdown complete"
        );
        report
    }
}

fn join_binder<T>(
    role: &str,
    outcome: Result<Result<T, BinderError>, tokio::task::JoinError>,
) -> Option<T> {
    match outcome {
        Ok(Ok(stats)) => Some(stats),
        Ok(Err(e)) => {
            warn!(role, error = %e, "Binder stopped with an error");
            None
        }
        Err(e) => {
            error!(role, error = %e, "Binder task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RuntimeConfig;
    use comments_service::CommentRepository;
    use shared_types::Comment;
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn test_reset_runs_before_input() {
        let container = ServiceContainer::in_memory(RuntimeConfig::default()).unwrap();
        container
            .repository
            .save_all(vec![Comment::new("old", "stale"), Comment::new("old", "stale")])
            .await
            .unwrap();

        let mut runtime = CommentRuntime::new(container);
        let input = b"{\"imageId\":\"new\",\"comment\":\"fresh\"}\n";
        let (writer, mut reader) = tokio::io::duplex(4096);

        runtime
            .start(BufReader::new(&input[..]), writer)
            .await
            .unwrap();
        runtime.wait_for_source().await;
        let report = runtime.shutdown().await;

        assert_eq!(report.reset_removed, Some(2));
        assert_eq!(report.adapter.forwarded, 1);

        let stored = runtime.container().repository.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].image_id.as_str(), "new");

        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_reset_can_be_disabled() {
        let config = RuntimeConfig {
            reset_on_startup: false,
            ..RuntimeConfig::default()
        };
        let container = ServiceContainer::in_memory(config).unwrap();
        container
            .repository
            .save(Comment::new("old", "kept"))
            .await
            .unwrap();

        let mut runtime = CommentRuntime::new(container);
        let (writer, _reader) = tokio::io::duplex(4096);
        runtime
            .start(BufReader::new(&b""[..]), writer)
            .await
            .unwrap();
        let report = runtime.shutdown().await;

        assert_eq!(report.reset_removed, None);
        assert_eq!(runtime.container().repository.count().await.unwrap(), 1);
    }
}
