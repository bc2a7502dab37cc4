//! # Channel Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{Comment, Message};
use uuid::Uuid;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChannelEvent {
    /// A comment arrived on the input binding and awaits processing.
    CommentReceived(Message<Comment>),

    /// A comment was persisted and is forwarded on the output binding.
    CommentSaved(Message<Comment>),

    /// Processing of a message failed. Routed to the DLQ.
    CriticalError {
        /// Component that hit the failure.
        source: String,
        /// Message that could not be processed, if known.
        message_id: Option<Uuid>,
        /// Error description.
        error: String,
    },
}

impl ChannelEvent {
    /// Topic of this event, used as a log field and metric label.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::CommentReceived(_) => EventTopic::Input,
            Self::CommentSaved(_) => EventTopic::Output,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Channel the event is delivered on: the envelope's channel, or the DLQ.
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::CommentReceived(msg) | Self::CommentSaved(msg) => &msg.channel,
            Self::CriticalError { .. } => crate::DLQ_CHANNEL,
        }
    }
}

/// Event topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Messages waiting to be processed.
    Input,
    /// Messages that were persisted.
    Output,
    /// Dead Letter Queue for failed messages.
    DeadLetterQueue,
}

impl EventTopic {
    /// Stable lowercase name, used as a metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::DeadLetterQueue => "dlq",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(channel: &str) -> ChannelEvent {
        ChannelEvent::CommentReceived(Message::new(channel, Comment::new("img", "hi")))
    }

    fn saved(channel: &str) -> ChannelEvent {
        ChannelEvent::CommentSaved(Message::new(channel, Comment::new("img", "hi")))
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(received("input").topic(), EventTopic::Input);
        assert_eq!(saved("output").topic(), EventTopic::Output);

        let dlq = ChannelEvent::CriticalError {
            source: "test".into(),
            message_id: None,
            error: "boom".into(),
        };
        assert_eq!(dlq.topic(), EventTopic::DeadLetterQueue);
        assert_eq!(dlq.channel(), crate::DLQ_CHANNEL);
    }

    #[test]
    fn test_channel_follows_envelope() {
        assert_eq!(received("comments-in").channel(), "comments-in");
        assert_eq!(saved("comments-out").channel(), "comments-out");
    }

    #[test]
    fn test_topic_labels() {
        assert_eq!(EventTopic::Output.as_str(), "output");
        assert_eq!(EventTopic::DeadLetterQueue.as_str(), "dlq");
    }
}
