//! # Shared Bus - Channel Bindings
//!
//! Carries comment messages between the binder source, the comment service
//! and the binder sink.
//!
//! ## Channels
//!
//! ```text
//! ┌──────────────┐   publish()    ┌───────────────────┐   recv()   ┌──────────────┐
//! │ Producer     │ ─────────────▶ │ channel → queue   │ ─────────▶ │ Consumer     │
//! │              │  waits if full │ (bounded, FIFO)   │            │ (one/channel)│
//! └──────────────┘                └───────────────────┘            └──────────────┘
//! ```
//!
//! - Every channel is bound to exactly one consumer queue; a queue may serve
//!   several channels (the sink takes both output and DLQ).
//! - `publish` waits for room instead of dropping: a full queue slows its
//!   producers down.
//! - Closing every channel of a queue ends the consumer once it has drained.
//! - Every payload is wrapped in a `Message<T>` envelope.

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ChannelEvent, EventTopic};
pub use publisher::{BindError, EventPublisher, InMemoryEventBus, PublishError};
pub use subscriber::{Subscription, SubscriptionError};

/// Queue size per binding.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Default logical name of the input binding.
pub const DEFAULT_INPUT_CHANNEL: &str = "input";

/// Default logical name of the output binding.
pub const DEFAULT_OUTPUT_CHANNEL: &str = "output";

/// Dead Letter Queue channel for failed messages.
pub const DLQ_CHANNEL: &str = "dlq.critical";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_names_differ() {
        assert_ne!(DEFAULT_INPUT_CHANNEL, DEFAULT_OUTPUT_CHANNEL);
        assert_ne!(DEFAULT_OUTPUT_CHANNEL, DLQ_CHANNEL);
    }
}
