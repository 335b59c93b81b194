//! Lookup result cache.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::domain::CacheKey;
use crate::store::{KeyValueStore, StoreError};

use super::{expiry_after, now_millis};

/// Stored result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResultEntry<T> {
    /// The cache key this row is stored under
    pub address_hash: String,
    pub locations: Vec<T>,
    /// The address the search was run for
    pub address: Value,
    pub expires_at: i64,
    pub created_at: i64,
    /// Upstream that produced the results, when the table is shared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl<T> CachedResultEntry<T> {
    /// Whether the row may be served at `now` (epoch millis).
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Cache of ordered lookup results keyed by [`CacheKey`].
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    table: String,
    source: Option<String>,
}

impl ResultCache {
    /// Create a result cache over `table` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            source: None,
        }
    }

    /// Tag rows written by this cache with an upstream name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Return the cached results for `key` if present and unexpired.
    ///
    /// Store errors and rows that do not decode as `T` are logged and
    /// reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<Vec<T>> {
        debug!(table = %self.table, key = %key, "Checking cache for locations");

        let item = match self.store.get(&self.table, key.as_str()).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                info!(key = %key, "Cache miss for locations");
                return None;
            }
            Err(e) => {
                error!(table = %self.table, error = %e, "Error fetching cached locations");
                return None;
            }
        };

        let entry: CachedResultEntry<T> = match serde_json::from_value(item) {
            Ok(entry) => entry,
            Err(e) => {
                error!(key = %key, error = %e, "Cached locations row is malformed");
                return None;
            }
        };

        if !entry.is_valid_at(now_millis()) {
            info!(key = %key, expires_at = entry.expires_at, "Cached locations have expired");
            return None;
        }

        info!(key = %key, location_count = entry.locations.len(), "Cache hit for locations");
        Some(entry.locations)
    }

    /// Cache `results` for `key`, valid for `ttl` from now.
    ///
    /// Empty result sets are not written, so a transient empty upstream
    /// answer is retried on the next request. Returns whether a row was
    /// written.
    pub async fn put<T: Serialize, A: Serialize>(
        &self,
        key: &CacheKey,
        address: &A,
        results: &[T],
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        if results.is_empty() {
            debug!(key = %key, "No locations to cache, skipping");
            return Ok(false);
        }

        let created_at = now_millis();
        let expires_at = expiry_after(created_at, ttl);

        let serialization = |e: serde_json::Error| StoreError::Serialization {
            message: e.to_string(),
        };

        let entry = CachedResultEntry {
            address_hash: key.to_string(),
            locations: results.iter().collect::<Vec<_>>(),
            address: serde_json::to_value(address).map_err(serialization)?,
            expires_at,
            created_at,
            source: self.source.clone(),
        };

        debug!(
            table = %self.table,
            key = %key,
            location_count = results.len(),
            expires_at,
            "Preparing to cache locations"
        );

        let item = serde_json::to_value(&entry).map_err(serialization)?;
        self.store
            .put(&self.table, key.as_str(), item)
            .await
            .inspect_err(|e| {
                error!(table = %self.table, key = %key, error = %e, "Error caching locations")
            })?;

        info!(key = %key, location_count = results.len(), expires_at, "Successfully cached locations");
        Ok(true)
    }
}
