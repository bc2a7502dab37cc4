//! Integration flows over the in-memory event bus.

pub mod failures;
pub mod flows;
