//! # RocksDB Comment Store
//!
//! Persistent implementation of the `CommentRepository` port.
//!
//! ## Layout
//!
//! - Key: `comment:<id>`
//! - Value: JSON `{"seq": <insertion sequence>, "comment": {...}}`
//!
//! `find_all` returns records in first-insertion order by sorting on `seq`;
//! an upsert keeps the sequence of the record it replaces.
//!
//! ## Features
//!
//! - Atomic batch writes (WriteBatch) for `save_all` and `delete_all`
//! - Snappy compression
//! - Blocking calls run on `spawn_blocking`

use async_trait::async_trait;
use comments_service::CommentRepository;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use serde::{Deserialize, Serialize};
use shared_types::{Comment, RepositoryError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

const KEY_PREFIX: &[u8] = b"comment:";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl RocksDbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }

    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredComment {
    seq: u64,
    comment: Comment,
}

/// RocksDB-backed comment repository
pub struct RocksDbCommentRepository {
    db: Arc<DB>,
    next_seq: Arc<AtomicU64>,
    sync_writes: bool,
}

impl RocksDbCommentRepository {
    /// Open or create the database at `config.path`.
    pub fn open(config: RocksDbConfig) -> Result<Self, RepositoryError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| RepositoryError::Unavailable(format!("Failed to open RocksDB: {e}")))?;

        let next_seq = scan(&db)?
            .iter()
            .map(|stored| stored.seq + 1)
            .max()
            .unwrap_or(0);
        debug!(path = %config.path.display(), next_seq, "RocksDB comment store opened");

        Ok(Self {
            db: Arc::new(db),
            next_seq: Arc::new(AtomicU64::new(next_seq)),
            sync_writes: config.sync_writes,
        })
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        write_opts
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&DB) -> Result<T, RepositoryError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| RepositoryError::Unavailable(format!("RocksDB task failed: {e}")))?
    }
}

fn key_for(comment: &Comment) -> Vec<u8> {
    let id = comment.id.as_ref().map_or("", |id| id.as_str());
    let mut key = KEY_PREFIX.to_vec();
    key.extend_from_slice(id.as_bytes());
    key
}

fn storage_err(e: rocksdb::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<StoredComment, RepositoryError> {
    serde_json::from_slice(bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Every stored record, in key order.
fn scan(db: &DB) -> Result<Vec<StoredComment>, RepositoryError> {
    let mut records = Vec::new();
    for item in db.iterator(IteratorMode::From(KEY_PREFIX, Direction::Forward)) {
        let (key, value) = item.map_err(storage_err)?;
        if !key.starts_with(KEY_PREFIX) {
            break;
        }
        records.push(decode(&value)?);
    }
    Ok(records)
}

fn scan_keys(db: &DB) -> Result<Vec<Box<[u8]>>, RepositoryError> {
    let mut keys = Vec::new();
    for item in db.iterator(IteratorMode::From(KEY_PREFIX, Direction::Forward)) {
        let (key, _) = item.map_err(storage_err)?;
        if !key.starts_with(KEY_PREFIX) {
            break;
        }
        keys.push(key);
    }
    Ok(keys)
}

#[async_trait]
impl CommentRepository for RocksDbCommentRepository {
    async fn save_all(&self, comments: Vec<Comment>) -> Result<Vec<Comment>, RepositoryError> {
        let next_seq = Arc::clone(&self.next_seq);
        let write_opts = self.write_options();

        self.blocking(move |db| {
            let mut batch = WriteBatch::default();
            // Sequences assigned earlier in this batch, for ids repeated within it
            let mut pending: HashMap<Vec<u8>, u64> = HashMap::new();
            let mut saved = Vec::with_capacity(comments.len());

            for mut comment in comments {
                comment.ensure_id();
                let key = key_for(&comment);

                let seq = match pending.get(&key) {
                    Some(seq) => *seq,
                    None => match db.get(&key).map_err(storage_err)? {
                        Some(existing) => decode(&existing)?.seq,
                        None => next_seq.fetch_add(1, Ordering::SeqCst),
                    },
                };
                pending.insert(key.clone(), seq);

                let stored = StoredComment {
                    seq,
                    comment: comment.clone(),
                };
                let value = serde_json::to_vec(&stored)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
                batch.put(&key, &value);
                saved.push(comment);
            }

            db.write_opt(batch, &write_opts).map_err(storage_err)?;
            Ok(saved)
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let write_opts = self.write_options();

        self.blocking(move |db| {
            let keys = scan_keys(db)?;
            let mut batch = WriteBatch::default();
            for key in &keys {
                batch.delete(key);
            }
            db.write_opt(batch, &write_opts).map_err(storage_err)?;
            Ok(keys.len() as u64)
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Comment>, RepositoryError> {
        self.blocking(|db| {
            let mut records = scan(db)?;
            records.sort_by_key(|stored| stored.seq);
            Ok(records.into_iter().map(|stored| stored.comment).collect())
        })
        .await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.blocking(|db| Ok(scan_keys(db)?.len() as u64)).await
    }
}
