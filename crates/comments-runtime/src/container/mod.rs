//! # Service Container
//!
//! Builds the event bus, repository, metrics recorder and comment service
//! from a `RuntimeConfig`.

pub mod config;
pub mod services;

pub use config::{BindingConfig, ConfigError, RuntimeConfig, StorageConfig, StoreBackend};
pub use services::{CommentServiceHandle, ContainerError, ServiceContainer};
