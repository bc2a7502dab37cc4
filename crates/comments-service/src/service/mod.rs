//! Service Layer
//!
//! Contains the application service that orchestrates validation,
//! persistence and metrics via ports.

pub mod comment_service;

pub use comment_service::CommentService;
