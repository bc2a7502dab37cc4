//! Comment Service
//!
//! Save, log, count, forward.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use shared_types::Comment;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::{validate_batch, validate_comment};
use crate::error::CommentError;
use crate::metrics::MetricsRecorder;
use crate::ports::{CommentIngestionApi, CommentRepository};

/// Comment Service implementation
///
/// Implements the `CommentIngestionApi` port using injected dependencies.
pub struct CommentService<R: ?Sized, M: ?Sized> {
    /// Comment store (driven port)
    repository: Arc<R>,
    /// Metrics sink (driven port)
    metrics: Arc<M>,
}

impl<R, M> CommentService<R, M>
where
    R: CommentRepository + ?Sized,
    M: MetricsRecorder + ?Sized,
{
    /// Create a new service over the given repository and metrics recorder
    pub fn new(repository: Arc<R>, metrics: Arc<M>) -> Self {
        Self {
            repository,
            metrics,
        }
    }

    /// Access the underlying repository
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    fn on_saved(&self, comment: &Comment) {
        info!(
            id = %comment.id.as_ref().map_or("", |id| id.as_str()),
            image_id = %comment.image_id,
            "Saving new comment {}",
            comment
        );
        self.metrics.record_comment_consumed(&comment.image_id);
    }
}

#[async_trait]
impl<R, M> CommentIngestionApi for CommentService<R, M>
where
    R: CommentRepository + ?Sized + 'static,
    M: MetricsRecorder + ?Sized + 'static,
{
    async fn save(&self, comment: Comment) -> Result<Comment, CommentError> {
        validate_comment(&comment)?;

        let start = Instant::now();
        let saved = match self.repository.save(comment).await {
            Ok(saved) => saved,
            Err(e) => {
                self.metrics.record_save_failure();
                warn!(error = %e, "Failed to save comment");
                return Err(e.into());
            }
        };
        self.metrics.record_save_duration(start.elapsed());

        self.on_saved(&saved);
        Ok(saved)
    }

    async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, CommentError> {
        if comments.is_empty() {
            return Ok(Vec::new());
        }
        validate_batch(&comments)?;

        let batch_len = comments.len();
        let start = Instant::now();
        let saved = match self.repository.save_all(comments).await {
            Ok(saved) => saved,
            Err(e) => {
                for _ in 0..batch_len {
                    self.metrics.record_save_failure();
                }
                warn!(error = %e, batch = batch_len, "Failed to save comment batch");
                return Err(e.into());
            }
        };
        self.metrics.record_save_duration(start.elapsed());

        for comment in &saved {
            self.on_saved(comment);
        }
        Ok(saved)
    }

    fn process<'a>(
        &'a self,
        input: BoxStream<'a, Comment>,
    ) -> BoxStream<'a, Result<Comment, CommentError>> {
        input.then(move |comment| self.save(comment)).boxed()
    }

    async fn reset(&self) -> Result<u64, CommentError> {
        let removed = self.repository.delete_all().await?;
        info!(removed, "Deleted existing comments");
        Ok(removed)
    }
}
