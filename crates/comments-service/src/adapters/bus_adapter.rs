//! Event Bus Adapter for the comments service
//!
//! Consumes `CommentReceived` events from the input binding, hands each
//! comment to the service and publishes the result:
//!
//! - success: `CommentSaved` on the output channel
//! - failure: `CriticalError` on the DLQ
//!
//! Events are handled one at a time, so output order follows input order.
//! Publishing waits for room on the consumer's queue, which in turn holds
//! back this adapter and, through the input queue, the source.

use crate::metrics::MetricsRecorder;
use crate::ports::CommentIngestionApi;
use shared_bus::{
    BindError, ChannelEvent, EventPublisher, EventTopic, InMemoryEventBus, Subscription,
};
use shared_types::{Comment, Message};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Component name reported on DLQ events
const ADAPTER_SOURCE: &str = "comments-service";

/// Counters returned when the adapter stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStats {
    /// Input events handled (success or failure)
    pub received: u64,
    /// Comments delivered on the output channel
    pub forwarded: u64,
    /// Events routed to the DLQ
    pub failed: u64,
    /// Results that found no consumer to deliver to
    pub undelivered: u64,
}

/// Bus adapter for the comments service
pub struct CommentBusAdapter<S: ?Sized, M: ?Sized> {
    /// Reference to the event bus
    bus: Arc<InMemoryEventBus>,
    /// The comment service
    service: Arc<S>,
    /// Metrics for published messages
    metrics: Arc<M>,
    /// Input binding, opened at construction
    subscription: Subscription,
    /// Channel name put on forwarded messages
    output_channel: String,
    stats: AdapterStats,
}

impl<S, M> CommentBusAdapter<S, M>
where
    S: CommentIngestionApi + ?Sized + 'static,
    M: MetricsRecorder + ?Sized + 'static,
{
    /// Create a new bus adapter bound to `input_channel`.
    ///
    /// The binding is opened here, so events published between construction
    /// and `run` are queued rather than refused.
    pub fn new(
        bus: Arc<InMemoryEventBus>,
        service: Arc<S>,
        metrics: Arc<M>,
        input_channel: impl Into<String>,
        output_channel: impl Into<String>,
    ) -> Result<Self, BindError> {
        let subscription = bus.bind([input_channel.into()])?;

        Ok(Self {
            bus,
            service,
            metrics,
            subscription,
            output_channel: output_channel.into(),
            stats: AdapterStats::default(),
        })
    }

    /// Handle events until the input channel is closed and drained.
    pub async fn run(mut self) -> AdapterStats {
        info!(
            channels = ?self.subscription.channels(),
            "[CommentBusAdapter] Started listening for events"
        );

        while let Some(event) = self.subscription.recv().await {
            self.handle_event(event).await;
        }

        info!(
            received = self.stats.received,
            forwarded = self.stats.forwarded,
            failed = self.stats.failed,
            undelivered = self.stats.undelivered,
            "[CommentBusAdapter] Input closed, stopped"
        );
        self.stats
    }

    /// Handle every event currently queued, without waiting for more.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(Some(event)) = self.subscription.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        if handled > 0 {
            debug!(handled, "[CommentBusAdapter] Drained queued events");
        }
        handled
    }

    /// Counters so far
    pub fn stats(&self) -> AdapterStats {
        self.stats
    }

    /// Handle an incoming channel event
    async fn handle_event(&mut self, event: ChannelEvent) {
        let ChannelEvent::CommentReceived(message) = event else {
            debug!("[CommentBusAdapter] Ignoring non-input event");
            return;
        };
        self.stats.received += 1;

        match self.service.save(message.payload.clone()).await {
            Ok(saved) => self.publish_saved(&message, saved).await,
            Err(e) => self.publish_failure(&message, e.to_string()).await,
        }
    }

    async fn publish_saved(&mut self, received: &Message<Comment>, saved: Comment) {
        let forwarded = received.forward(self.output_channel.clone(), saved);
        let forwarded_id = forwarded.message_id;

        match self.bus.publish(ChannelEvent::CommentSaved(forwarded)).await {
            Ok(()) => {
                debug!(
                    message_id = %received.message_id,
                    forwarded_id = %forwarded_id,
                    "Forwarded saved comment"
                );
                self.metrics.record_published(EventTopic::Output.as_str());
                self.stats.forwarded += 1;
            }
            Err(e) => {
                error!(
                    message_id = %received.message_id,
                    error = %e,
                    "Saved comment could not be forwarded"
                );
                self.stats.undelivered += 1;
            }
        }
    }

    async fn publish_failure(&mut self, received: &Message<Comment>, reason: String) {
        error!(
            message_id = %received.message_id,
            image_id = %received.payload.image_id,
            error = %reason,
            "Comment could not be processed, routing to DLQ"
        );
        self.stats.failed += 1;

        let event = ChannelEvent::CriticalError {
            source: ADAPTER_SOURCE.to_string(),
            message_id: Some(received.message_id),
            error: reason,
        };
        match self.bus.publish(event).await {
            Ok(()) => self
                .metrics
                .record_published(EventTopic::DeadLetterQueue.as_str()),
            Err(e) => {
                error!(message_id = %received.message_id, error = %e, "DLQ unavailable");
                self.stats.undelivered += 1;
            }
        }
    }
}
