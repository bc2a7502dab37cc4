//! Domain Layer
//!
//! Pure rules applied to comments before they reach a repository.

pub mod validation;

pub use validation::{validate_batch, validate_comment};
