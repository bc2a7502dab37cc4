//! Adapters Layer
//!
//! Connects the service to the outside world:
//!
//! - `InMemoryCommentRepository`: default comment store
//! - `CommentBusAdapter`: consumes the input topic, publishes output and DLQ events

pub mod bus_adapter;
pub mod memory_repository;

pub use bus_adapter::{AdapterStats, CommentBusAdapter};
pub use memory_repository::InMemoryCommentRepository;
