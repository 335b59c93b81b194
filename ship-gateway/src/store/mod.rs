//! Key-value storage backends.
//!
//! Every cache in the gateway is a table of JSON items addressed by a
//! string key. Production deployments point this at a managed store; the
//! in-memory and file-backed stores here serve local runs and tests.

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Item could not be encoded or decoded
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A table-partitioned store of JSON items.
///
/// `put` overwrites any prior item under the same key (last write wins).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the item stored under `key`, if any.
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `item` under `key`, replacing any previous item.
    async fn put(&self, table: &str, key: &str, item: Value) -> Result<(), StoreError>;
}
