//! # Comments Service
//!
//! Consumes comments from the input channel, persists them, counts them per
//! image and forwards the persisted records to the output channel.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Validation rules, no I/O
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `CommentIngestionApi`: Driving port (inbound API)
//!   - `CommentRepository`: Driven port (comment store)
//!   - `MetricsRecorder`: Driven port (counter sink), in `metrics`
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `CommentService`: Implements `CommentIngestionApi`
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `InMemoryCommentRepository`: Default store
//!   - `CommentBusAdapter`: Input channel consumer, output/DLQ publisher
//!
//! ## Invariants
//!
//! - **N in, N out**: every input element yields exactly one output element
//!   (a persisted comment or an error), in arrival order.
//! - **One count per forward**: `comments.consumed{imageId}` is incremented
//!   once per successfully persisted comment and never for a failure.
//!
//! ## Wiring
//!
//! ```ignore
//! use comments_service::{CommentBusAdapter, CommentService, InMemoryCommentRepository, Metrics};
//! use shared_bus::InMemoryEventBus;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(InMemoryEventBus::new());
//! let metrics = Arc::new(Metrics::new());
//! let service = Arc::new(CommentService::new(
//!     Arc::new(InMemoryCommentRepository::new()),
//!     metrics.clone(),
//! ));
//!
//! // Bind before resetting so input published meanwhile is queued
//! let adapter =
//!     CommentBusAdapter::new(bus.clone(), service.clone(), metrics, "input", "output")?;
//! service.reset().await?;
//! let handle = tokio::spawn(adapter.run());
//!
//! // Closing the input channel lets the adapter finish what is queued
//! bus.close("input");
//! let stats = handle.await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{AdapterStats, CommentBusAdapter, InMemoryCommentRepository};
pub use error::CommentError;
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{CommentIngestionApi, CommentRepository};
pub use service::CommentService;
pub use shared_types::{Comment, CommentId, ImageId, RepositoryError};
