//! # Shared Types Crate
//!
//! This crate contains the domain entities and the `Message<T>` envelope
//! that travel between the event bus, the comment service and the runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The `Comment` wire shape is defined here only.
//! - **Envelope Integrity**: Everything published to the bus is wrapped in
//!   `Message<T>`; payloads never carry routing information themselves.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::Message;
pub use errors::*;
