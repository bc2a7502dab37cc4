//! # Comments Runtime Library
//!
//! Exposes the runtime modules for the binary and for integration tests.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and dependency wiring
//! - `adapters/` - Port implementations: Prometheus metrics, stdio binder, storage
//! - `runtime` - Startup reset, task supervision and graceful shutdown
//!
//! ## Flow
//!
//! ```text
//! stdin ──▶ BinderSource ──CommentReceived──▶ Event Bus ──▶ CommentBusAdapter
//!                                                              │ save, log, count
//! stdout ◀── BinderSink ◀──CommentSaved / CriticalError───────┘
//! ```

pub mod adapters;
pub mod container;
pub mod runtime;

pub use container::{ConfigError, RuntimeConfig, ServiceContainer, StoreBackend};
pub use runtime::{CommentRuntime, RuntimeReport};
