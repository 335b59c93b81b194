//! In-process store backed by moka.

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde_json::Value;

use super::{KeyValueStore, StoreError};

/// Default maximum number of items held across all tables.
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Items keyed by (table, key).
type ItemKey = (String, String);

/// In-memory key-value store.
///
/// Items have no TTL at this layer: expiry is recorded in the item itself
/// and enforced by the typed caches on read. Cloning shares the underlying
/// storage.
#[derive(Clone)]
pub struct MemoryStore {
    items: MokaCache<ItemKey, Value>,
}

impl MemoryStore {
    /// Create a store holding at most `max_capacity` items.
    pub fn new(max_capacity: u64) -> Self {
        let items = MokaCache::builder().max_capacity(max_capacity).build();
        Self { items }
    }

    /// Number of stored items (after pending maintenance has run).
    pub async fn len(&self) -> u64 {
        self.items.run_pending_tasks().await;
        self.items.entry_count()
    }

    /// Whether the store holds no items.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.items.get(&(table.to_string(), key.to_string())).await)
    }

    async fn put(&self, table: &str, key: &str, item: Value) -> Result<(), StoreError> {
        self.items
            .insert((table.to_string(), key.to_string()), item)
            .await;
        Ok(())
    }
}
