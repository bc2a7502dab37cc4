//! Comment validation
//!
//! The image identifier doubles as the metric tag, so it must carry a value.

use shared_types::Comment;

use crate::error::CommentError;

/// Check a single comment.
pub fn validate_comment(comment: &Comment) -> Result<(), CommentError> {
    if comment.image_id.is_blank() {
        return Err(CommentError::InvalidComment(format!(
            "blank imageId on {comment}"
        )));
    }
    Ok(())
}

/// Check every comment of a batch; the first failure wins.
pub fn validate_batch(comments: &[Comment]) -> Result<(), CommentError> {
    comments.iter().try_for_each(validate_comment)
}
