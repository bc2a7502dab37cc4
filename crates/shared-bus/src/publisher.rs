//! # Channel Publisher
//!
//! Binds channel names to bounded consumer queues and delivers events to them.

use crate::events::ChannelEvent;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors raised while delivering an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// Nothing consumes this channel.
    #[error("no consumer bound to channel '{0}'")]
    Unbound(String),

    /// The consumer dropped its subscription.
    #[error("consumer of channel '{0}' has gone away")]
    Closed(String),
}

/// Errors raised while binding a consumer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    /// Another live subscription already consumes the channel.
    #[error("channel '{0}' already has a consumer")]
    AlreadyBound(String),
}

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver an event to the consumer bound to its channel.
    ///
    /// Waits while that consumer's queue is full; events are never dropped
    /// for lack of room.
    async fn publish(&self, event: ChannelEvent) -> Result<(), PublishError>;

    /// Total number of events delivered.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the channel bus.
///
/// Each binding is a bounded `tokio::sync::mpsc` queue with a single consumer.
/// Suitable for single-process operation; a broker-backed deployment would
/// provide another `EventPublisher`.
pub struct InMemoryEventBus {
    /// Channel name to the sending half of its consumer queue.
    bindings: RwLock<HashMap<String, mpsc::Sender<ChannelEvent>>>,

    /// Total events delivered.
    events_published: AtomicU64,

    /// Queue size per binding.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a bus with the default queue size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus whose queues hold `capacity` events.
    ///
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Bind one consumer queue to the given channels.
    ///
    /// Events published on any of them after this call are queued for the
    /// returned subscription, in publish order. A channel whose previous
    /// subscription was dropped can be bound again.
    pub fn bind<I, S>(&self, channels: I) -> Result<Subscription, BindError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels: Vec<String> = channels.into_iter().map(Into::into).collect();
        let mut bindings = self.bindings.write();

        if let Some(taken) = channels
            .iter()
            .find(|c| bindings.get(c.as_str()).is_some_and(|s| !s.is_closed()))
        {
            return Err(BindError::AlreadyBound(taken.clone()));
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        for channel in &channels {
            bindings.insert(channel.clone(), sender.clone());
        }
        debug!(?channels, capacity = self.capacity, "Channels bound");

        Ok(Subscription::new(receiver, channels))
    }

    /// Stop accepting events on `channel`.
    ///
    /// Events already queued stay deliverable; once every channel of a
    /// subscription is closed its `recv` returns `None` after the last one.
    pub fn close(&self, channel: &str) -> bool {
        let removed = self.bindings.write().remove(channel).is_some();
        if removed {
            debug!(channel, "Channel closed");
        }
        removed
    }

    /// Queue size per binding.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: ChannelEvent) -> Result<(), PublishError> {
        let channel = event.channel().to_string();
        let topic = event.topic();

        let sender = self.bindings.read().get(&channel).cloned();
        let Some(sender) = sender else {
            warn!(channel = %channel, topic = ?topic, "No consumer bound, event not delivered");
            return Err(PublishError::Unbound(channel));
        };

        if sender.send(event).await.is_err() {
            warn!(channel = %channel, topic = ?topic, "Consumer gone, event not delivered");
            return Err(PublishError::Closed(channel));
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);
        debug!(channel = %channel, topic = ?topic, "Event published");
        Ok(())
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
