//! Inbound Ports (Driving Ports)
//!
//! The API that the bus adapter (or any other driver) uses to hand
//! comments to the service.

use async_trait::async_trait;
use futures::stream::BoxStream;
use shared_types::Comment;

use crate::error::CommentError;

/// Primary comment ingestion API (Driving Port)
#[async_trait]
pub trait CommentIngestionApi: Send + Sync {
    /// Persist a single comment, log it, count it and return the stored record.
    async fn save(&self, comment: Comment) -> Result<Comment, CommentError>;

    /// Persist a batch in one repository call.
    ///
    /// The batch is validated up front; an invalid element rejects the whole
    /// batch before anything is written. Saved records are logged and counted
    /// in input order and returned in that order.
    async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, CommentError>;

    /// Streaming form of `save`.
    ///
    /// Elements are processed one at a time in arrival order. The output has
    /// exactly one item per input item: the persisted comment or the error
    /// that prevented persisting it.
    fn process<'a>(
        &'a self,
        input: BoxStream<'a, Comment>,
    ) -> BoxStream<'a, Result<Comment, CommentError>>;

    /// Delete every stored comment. Returns the number removed.
    async fn reset(&self) -> Result<u64, CommentError>;
}
