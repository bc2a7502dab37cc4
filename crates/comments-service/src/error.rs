//! Error types for the comments service

use shared_types::RepositoryError;
use thiserror::Error;

/// Errors that can occur while ingesting comments
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("Invalid comment: {0}")]
    InvalidComment(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
