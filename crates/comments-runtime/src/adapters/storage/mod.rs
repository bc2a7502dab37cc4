//! Persistent comment stores.
//!
//! Enable with `--features rocksdb`.

#[cfg(feature = "rocksdb")]
mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbCommentRepository, RocksDbConfig};
