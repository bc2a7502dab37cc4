//! # Subscription
//!
//! Receiving half of a channel binding.

use crate::events::ChannelEvent;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every channel of the subscription was closed and the queue is empty.
    #[error("Subscription closed")]
    Closed,
}

/// The consumer queue of one or more bound channels.
///
/// Dropping it releases the channels for another consumer.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<ChannelEvent>,
    channels: Vec<String>,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<ChannelEvent>, channels: Vec<String>) -> Self {
        Self { receiver, channels }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once every bound channel is closed and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Result<Option<ChannelEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Channels feeding this subscription.
    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }
}
