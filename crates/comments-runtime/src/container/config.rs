//! # Runtime Configuration
//!
//! Unified configuration for the service, its channel bindings and storage.
//!
//! Numeric and boolean variables that fail to parse fall back to their
//! default with a warning. An unknown storage backend is an error.

use shared_bus::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_INPUT_CHANNEL, DEFAULT_OUTPUT_CHANNEL};
use std::env;
use std::path::PathBuf;
use stream_telemetry::TelemetryConfig;
use thiserror::Error;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Logging and metrics configuration.
    pub telemetry: TelemetryConfig,
    /// Channel bindings.
    pub bindings: BindingConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Delete every stored comment before the input channel is consumed.
    pub reset_on_startup: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            bindings: BindingConfig::default(),
            storage: StorageConfig::default(),
            reset_on_startup: true,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Telemetry settings are left at their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bindings = BindingConfig {
            input_channel: lookup("COMMENTS_INPUT_CHANNEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bindings.input_channel),
            output_channel: lookup("COMMENTS_OUTPUT_CHANNEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.bindings.output_channel),
            bus_capacity: parse_or_default(
                "COMMENTS_BUS_CAPACITY",
                lookup("COMMENTS_BUS_CAPACITY"),
                defaults.bindings.bus_capacity,
                |v| v.parse::<usize>().ok().filter(|n| *n > 0),
            ),
        };

        let backend = match lookup("COMMENTS_STORE") {
            Some(value) => value.parse()?,
            None => defaults.storage.backend,
        };

        let storage = StorageConfig {
            backend,
            data_dir: lookup("COMMENTS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage.data_dir),
        };

        let reset_on_startup = parse_or_default(
            "COMMENTS_RESET_ON_STARTUP",
            lookup("COMMENTS_RESET_ON_STARTUP"),
            defaults.reset_on_startup,
            parse_bool,
        );

        Ok(Self {
            telemetry: defaults.telemetry,
            bindings,
            storage,
            reset_on_startup,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `COMMENTS_STORE` names a backend that does not exist.
    #[error("unknown storage backend '{0}' (expected 'memory' or 'rocksdb')")]
    UnknownBackend(String),

    /// The backend exists but this binary was built without it.
    #[error("storage backend '{0}' is not compiled in; rebuild with --features {0}")]
    BackendUnavailable(String),
}

/// Logical channel bindings.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Channel the comments are consumed from.
    pub input_channel: String,
    /// Channel the persisted comments are republished on.
    pub output_channel: String,
    /// Queue size of each channel binding.
    pub bus_capacity: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            input_channel: DEFAULT_INPUT_CHANNEL.to_string(),
            output_channel: DEFAULT_OUTPUT_CHANNEL.to_string(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local store, emptied on exit.
    #[default]
    Memory,
    /// RocksDB store under `data_dir`.
    RocksDb,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::RocksDb => "rocksdb",
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "rocksdb" => Ok(StoreBackend::RocksDb),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Which repository implementation to build.
    pub backend: StoreBackend,
    /// Data directory for persistent backends.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            data_dir: PathBuf::from("./data/comments"),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or_default<T, P>(key: &str, raw: Option<String>, default: T, parse: P) -> T
where
    T: std::fmt::Debug,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = raw else {
        return default;
    };
    match parse(&raw) {
        Some(value) => value,
        None => {
            warn!(variable = key, value = %raw, fallback = ?default, "Invalid value, using default");
            default
        }
    }
}
