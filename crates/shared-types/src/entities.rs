//! # Core Domain Entities
//!
//! The `Comment` record and its identifier newtypes.
//!
//! Wire field names follow the JSON convention used by upstream producers:
//! `id`, `imageId`, `comment`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    /// Generate a fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of the image a comment belongs to.
///
/// Used verbatim as the `imageId` metric tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identifier is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A user comment attached to an image.
///
/// `id` is `None` until the comment has been stored; the repository assigns
/// one on first save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Storage identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,
    /// Image this comment belongs to.
    pub image_id: ImageId,
    /// Comment text.
    #[serde(default)]
    pub comment: String,
}

impl Comment {
    /// Create an unsaved comment.
    pub fn new(image_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: None,
            image_id: ImageId(image_id.into()),
            comment: comment.into(),
        }
    }

    /// Builder-style setter for the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(CommentId(id.into()));
        self
    }

    /// Whether the comment has been assigned a storage identifier.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Return the identifier, assigning a fresh one if absent.
    pub fn ensure_id(&mut self) -> &CommentId {
        self.id.get_or_insert_with(CommentId::generate)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.as_ref().map_or("<unsaved>", CommentId::as_str);
        write!(
            f,
            "Comment(id={}, imageId={}, comment={:?})",
            id, self.image_id, self.comment
        )
    }
}
