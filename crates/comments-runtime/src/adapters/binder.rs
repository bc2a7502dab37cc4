//! # Stdio Binder
//!
//! Binds the logical channels to a byte stream transport, one JSON document
//! per line.
//!
//! - `BinderSource`: reads `Comment` lines and publishes `CommentReceived`
//!   on the input channel. Lines that do not decode are logged and skipped.
//! - `BinderSink`: binds the output channel and the DLQ, writes every
//!   `CommentSaved` as a line and logs DLQ events. It stops once both
//!   channels are closed and drained.
//!
//! The runtime binds these to stdin/stdout; tests bind them to in-memory
//! duplex pipes.

use shared_bus::{
    BindError, ChannelEvent, EventPublisher, InMemoryEventBus, PublishError, Subscription,
    DLQ_CHANNEL,
};
use shared_types::{Comment, Message};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Binder transport errors.
#[derive(Debug, Error)]
pub enum BinderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode comment: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("input not delivered: {0}")]
    Publish(#[from] PublishError),
}

/// Counters returned when the source stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Lines decoded and published
    pub published: u64,
    /// Lines that failed to decode
    pub rejected: u64,
}

/// Reads JSON-lines comments and publishes them on the input channel.
pub struct BinderSource<R> {
    reader: R,
    bus: Arc<InMemoryEventBus>,
    channel: String,
    stats: SourceStats,
}

impl<R> BinderSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, bus: Arc<InMemoryEventBus>, channel: impl Into<String>) -> Self {
        Self {
            reader,
            bus,
            channel: channel.into(),
            stats: SourceStats::default(),
        }
    }

    /// Read until EOF or until `shutdown` flips to `true`.
    ///
    /// Each comment is handed to the input queue before the next line is
    /// read. Stops with an error if nothing consumes the input channel.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<SourceStats, BinderError> {
        info!(channel = %self.channel, "[BinderSource] Reading comments");

        let mut lines = (&mut self.reader).lines();
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[BinderSource] Shutdown requested");
                        break;
                    }
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if let Err(e) =
                            publish_line(&self.bus, &self.channel, &mut self.stats, &line).await
                        {
                            error!(error = %e, "[BinderSource] Input channel unavailable, stopping");
                            return Err(e.into());
                        }
                    }
                    None => {
                        info!("[BinderSource] End of input");
                        break;
                    }
                },
            }
        }

        info!(
            published = self.stats.published,
            rejected = self.stats.rejected,
            "[BinderSource] Stopped"
        );
        Ok(self.stats)
    }
}

async fn publish_line(
    bus: &InMemoryEventBus,
    channel: &str,
    stats: &mut SourceStats,
    line: &str,
) -> Result<(), PublishError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<Comment>(line) {
        Ok(comment) => {
            let message = Message::new(channel, comment);
            debug!(message_id = %message.message_id, "[BinderSource] Publishing comment");
            bus.publish(ChannelEvent::CommentReceived(message)).await?;
            stats.published += 1;
        }
        Err(e) => {
            warn!(error = %e, line, "[BinderSource] Skipping undecodable line");
            stats.rejected += 1;
        }
    }
    Ok(())
}

/// Counters returned when the sink stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Comments written to the output
    pub written: u64,
    /// DLQ events observed
    pub dead_lettered: u64,
}

/// Writes persisted comments as JSON lines.
pub struct BinderSink<W> {
    writer: W,
    subscription: Subscription,
    stats: SinkStats,
}

impl<W> BinderSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Bind the output channel and the DLQ.
    ///
    /// Binding here means nothing published after construction is refused.
    pub fn new(
        bus: &InMemoryEventBus,
        output_channel: impl Into<String>,
        writer: W,
    ) -> Result<Self, BindError> {
        let subscription = bus.bind([output_channel.into(), DLQ_CHANNEL.to_string()])?;

        Ok(Self {
            writer,
            subscription,
            stats: SinkStats::default(),
        })
    }

    /// Write events until the output channel and the DLQ are both closed.
    pub async fn run(mut self) -> Result<SinkStats, BinderError> {
        while let Some(event) = self.subscription.recv().await {
            self.handle_event(event).await?;
        }
        self.writer.flush().await?;

        info!(
            written = self.stats.written,
            dead_lettered = self.stats.dead_lettered,
            "[BinderSink] Stopped"
        );
        Ok(self.stats)
    }

    async fn handle_event(&mut self, event: ChannelEvent) -> Result<(), BinderError> {
        match event {
            ChannelEvent::CommentSaved(message) => {
                let mut line = serde_json::to_vec(&message.payload)?;
                line.push(b'\n');
                self.writer.write_all(&line).await?;
                self.writer.flush().await?;
                self.stats.written += 1;
            }
            ChannelEvent::CriticalError {
                source,
                message_id,
                error,
            } => {
                error!(
                    source = %source,
                    message_id = ?message_id,
                    error = %error,
                    "[BinderSink] Comment dead-lettered"
                );
                self.stats.dead_lettered += 1;
            }
            ChannelEvent::CommentReceived(_) => {}
        }
        Ok(())
    }
}
