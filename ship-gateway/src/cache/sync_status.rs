//! Per-product sync status records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::shopify::ShopifyProductRef;
use crate::store::{KeyValueStore, StoreError};

/// Outcome of the last sync attempt for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Success,
    Failed,
}

/// Stored sync status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub product_id: String,
    /// RFC 3339 timestamp of the attempt
    pub last_synced_at: String,
    pub status: SyncState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopify_data: Option<ShopifyProductRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Store of sync status rows keyed by Vinoshipper product id.
#[derive(Clone)]
pub struct SyncStatusStore {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl SyncStatusStore {
    /// Create a status store over `table` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Fetch the status of a product. Store errors read as "never synced".
    pub async fn get(&self, product_id: &str) -> Option<SyncStatus> {
        match self.store.get(&self.table, product_id).await {
            Ok(item) => item.and_then(|item| serde_json::from_value(item).ok()),
            Err(e) => {
                error!(product_id, error = %e, "Failed to get sync status");
                None
            }
        }
    }

    /// Write the status of a product, replacing any previous row.
    pub async fn put(&self, status: &SyncStatus) -> Result<(), StoreError> {
        let item = serde_json::to_value(status).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;

        self.store
            .put(&self.table, &status.product_id, item)
            .await
            .inspect_err(|e| {
                error!(product_id = %status.product_id, error = %e, "Failed to update sync status")
            })
    }
}
