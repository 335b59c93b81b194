//! Compliance result cache.
//!
//! Only compliant results are ever written, and they do not expire: once a
//! customer/ship-to pair has been cleared it stays cleared.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::store::{KeyValueStore, StoreError};

use super::now_millis;

/// Stored compliance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRecord {
    pub customer_key: String,
    pub compliance: Value,
    pub vinoshipper_response: Value,
    pub created_at: i64,
}

/// Cache of compliance check results keyed by customer key.
#[derive(Clone)]
pub struct ComplianceCache {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl ComplianceCache {
    /// Create a compliance cache over `table` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Look up a cached compliance result. Store errors read as a miss.
    pub async fn get(&self, customer_key: &str) -> Option<ComplianceRecord> {
        debug!(table = %self.table, "Checking compliance cache");

        match self.store.get(&self.table, customer_key).await {
            Ok(item) => item.and_then(|item| {
                serde_json::from_value(item)
                    .inspect_err(|e| error!(error = %e, "Cached compliance row is malformed"))
                    .ok()
            }),
            Err(e) => {
                error!(table = %self.table, error = %e, "Error reading compliance cache");
                None
            }
        }
    }

    /// Record a compliant result.
    pub async fn save(&self, customer_key: &str, data: &Value) -> Result<(), StoreError> {
        let record = ComplianceRecord {
            customer_key: customer_key.to_string(),
            compliance: data.clone(),
            vinoshipper_response: data.clone(),
            created_at: now_millis(),
        };

        let item = serde_json::to_value(&record).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;

        self.store.put(&self.table, customer_key, item).await
    }
}
