//! # Error Types
//!
//! Error types shared across crates.

use thiserror::Error;

/// Errors raised by a comment store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store rejected or failed the operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store is not reachable (closed, shut down, task panicked).
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}
