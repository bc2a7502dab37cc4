//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the bus adapter and other callers
//! - Driven Ports (outbound) - The comment store

pub mod inbound;
pub mod outbound;

pub use inbound::CommentIngestionApi;
pub use outbound::CommentRepository;
