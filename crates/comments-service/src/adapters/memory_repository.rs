//! In-memory comment store
//!
//! Insertion-ordered; replacing an existing id keeps its original position.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Comment, CommentId, ImageId, RepositoryError};
use std::collections::HashMap;

use crate::ports::CommentRepository;

#[derive(Default)]
struct Store {
    order: Vec<CommentId>,
    records: HashMap<CommentId, Comment>,
}

/// Comment repository backed by process memory
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<Store>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with comments
    pub fn with_comments(comments: impl IntoIterator<Item = Comment>) -> Self {
        let repo = Self::new();
        {
            let mut store = repo.store.write();
            for comment in comments {
                Self::upsert(&mut store, comment);
            }
        }
        repo
    }

    fn upsert(store: &mut Store, mut comment: Comment) -> Comment {
        let id = comment.ensure_id().clone();
        if store.records.insert(id.clone(), comment.clone()).is_none() {
            store.order.push(id);
        }
        comment
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, RepositoryError> {
        let mut store = self.store.write();
        Ok(comments
            .into_iter()
            .map(|comment| Self::upsert(&mut store, comment))
            .collect())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut store = self.store.write();
        let removed = store.records.len() as u64;
        store.records.clear();
        store.order.clear();
        Ok(removed)
    }

    async fn find_all(&self) -> Result<Vec<Comment>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .order
            .iter()
            .filter_map(|id| store.records.get(id).cloned())
            .collect())
    }

    async fn find_by_image(&self, image_id: &ImageId) -> Result<Vec<Comment>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .order
            .iter()
            .filter_map(|id| store.records.get(id))
            .filter(|c| &c.image_id == image_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.read().records.len() as u64)
    }
}
