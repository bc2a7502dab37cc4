//! Outbound Ports (Driven Ports)
//!
//! What the service needs from a comment store.

use async_trait::async_trait;
use shared_types::{Comment, ImageId, RepositoryError};

/// Comment store (Driven Port)
///
/// Implementations assign an id to every comment saved without one and
/// treat a save of an existing id as a replacement.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a batch and return the stored records in input order.
    ///
    /// Either all records are stored or none are.
    async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, RepositoryError>;

    /// Persist one record.
    async fn save(&self, comment: Comment) -> Result<Comment, RepositoryError> {
        self.save_all(vec![comment])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::Storage("save returned no record".to_string()))
    }

    /// Remove every stored comment. Returns the number removed.
    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    /// All stored comments in insertion order.
    async fn find_all(&self) -> Result<Vec<Comment>, RepositoryError>;

    /// Stored comments for one image, in insertion order.
    async fn find_by_image(&self, image_id: &ImageId) -> Result<Vec<Comment>, RepositoryError> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|c| &c.image_id == image_id)
            .collect())
    }

    /// Number of stored comments.
    async fn count(&self) -> Result<u64, RepositoryError>;
}
