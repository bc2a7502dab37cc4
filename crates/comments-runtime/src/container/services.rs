//! # Service Container
//!
//! Holds the shared infrastructure and the comment service.
//!
//! ## Initialization Order
//!
//! ```text
//! 1. Event bus (sized from the binding config)
//! 2. Metrics recorder (Prometheus registry from telemetry)
//! 3. Repository (backend from the storage config)
//! 4. Comment service over repository + metrics
//! ```

use std::sync::Arc;

use comments_service::{CommentRepository, CommentService, InMemoryCommentRepository};
use shared_bus::InMemoryEventBus;
use shared_types::RepositoryError;
use stream_telemetry::{MetricsRegistry, TelemetryError};
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::PrometheusMetrics;
use crate::container::config::{ConfigError, RuntimeConfig, StoreBackend};

/// Concrete service type wired by the runtime.
pub type CommentServiceHandle = CommentService<dyn CommentRepository, PrometheusMetrics>;

/// Errors raised while wiring the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open comment store: {0}")]
    Storage(#[from] RepositoryError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Central container holding every runtime component.
pub struct ServiceContainer {
    /// Event bus connecting the binder and the service adapter.
    pub event_bus: Arc<InMemoryEventBus>,

    /// Comment store selected by configuration.
    pub repository: Arc<dyn CommentRepository>,

    /// Prometheus-backed metrics recorder.
    pub metrics: Arc<PrometheusMetrics>,

    /// The comment service.
    pub service: Arc<CommentServiceHandle>,

    /// Runtime configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl ServiceContainer {
    /// Wire all components from `config`.
    #[instrument(name = "container_init", skip_all)]
    pub fn new(
        config: RuntimeConfig,
        registry: Arc<MetricsRegistry>,
    ) -> Result<Self, ContainerError> {
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(
            config.bindings.bus_capacity,
        ));
        info!(capacity = event_bus.capacity(), "Event bus created");

        let metrics = Arc::new(PrometheusMetrics::new(registry));

        let repository = open_repository(&config)?;
        info!(backend = config.storage.backend.as_str(), "Comment store ready");

        let service = Arc::new(CommentService::new(
            Arc::clone(&repository),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            event_bus,
            repository,
            metrics,
            service,
            config,
        })
    }

    /// Container with defaults for tests: in-memory store, fresh registry.
    pub fn in_memory(mut config: RuntimeConfig) -> Result<Self, ContainerError> {
        config.storage.backend = StoreBackend::Memory;
        Self::new(config, Arc::new(MetricsRegistry::new()?))
    }
}

fn open_repository(config: &RuntimeConfig) -> Result<Arc<dyn CommentRepository>, ContainerError> {
    match config.storage.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryCommentRepository::new())),
        #[cfg(feature = "rocksdb")]
        StoreBackend::RocksDb => {
            use crate::adapters::storage::{RocksDbCommentRepository, RocksDbConfig};
            let store = RocksDbCommentRepository::open(RocksDbConfig::new(
                config.storage.data_dir.clone(),
            ))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::RocksDb => Err(ConfigError::BackendUnavailable(
            StoreBackend::RocksDb.as_str().to_string(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comments_service::CommentIngestionApi;
    use shared_types::Comment;

    #[tokio::test]
    async fn test_in_memory_container_saves_and_counts() {
        let container = ServiceContainer::in_memory(RuntimeConfig::default()).unwrap();

        container
            .service
            .save(Comment::new("img-1", "first"))
            .await
            .unwrap();

        assert_eq!(container.repository.count().await.unwrap(), 1);
        assert_eq!(container.metrics.registry().consumed_count("img-1"), 1);
    }

    #[tokio::test]
    async fn test_bus_capacity_from_config() {
        let mut config = RuntimeConfig::default();
        config.bindings.bus_capacity = 16;
        let container = ServiceContainer::in_memory(config).unwrap();
        assert_eq!(container.event_bus.capacity(), 16);
    }

    #[cfg(not(feature = "rocksdb"))]
    #[test]
    fn test_rocksdb_without_feature_is_rejected() {
        let mut config = RuntimeConfig::default();
        config.storage.backend = StoreBackend::RocksDb;
        let registry = Arc::new(MetricsRegistry::new().unwrap());

        let result = ServiceContainer::new(config, registry);
        assert!(matches!(
            result,
            Err(ContainerError::Config(ConfigError::BackendUnavailable(_)))
        ));
    }
}
