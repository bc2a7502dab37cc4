//! # `Message` Envelope
//!
//! The wrapper for every record published to the event bus.
//!
//! ## Properties
//!
//! - **Versioning**: All messages include a `version` field for forward compatibility.
//! - **Identity**: Each message gets its own `message_id`; republishing a payload
//!   creates a new message rather than mutating the old one.
//! - **Routing**: `channel` names the logical binding the message was published on.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A payload plus the headers the bus and binders need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message<T> {
    /// Protocol version.
    pub version: u16,

    /// Unique identifier of this message.
    pub message_id: Uuid,

    /// Logical channel the message travels on (e.g. `input`, `output`).
    pub channel: String,

    /// Unix timestamp (seconds) when the message was created.
    pub timestamp: u64,

    /// The actual payload.
    pub payload: T,
}

impl<T> Message<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Wrap a payload for the given channel.
    pub fn new(channel: impl Into<String>, payload: T) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            message_id: Uuid::new_v4(),
            channel: channel.into(),
            timestamp: unix_now(),
            payload,
        }
    }

    /// Wrap a new payload for another channel, keeping nothing but the version.
    pub fn forward<U>(&self, channel: impl Into<String>, payload: U) -> Message<U> {
        Message {
            version: self.version,
            message_id: Uuid::new_v4(),
            channel: channel.into(),
            timestamp: unix_now(),
            payload,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
