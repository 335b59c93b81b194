//! Cached Vinoshipper access-point lookup.
//!
//! Same shape as the UPS lookup minus the token step: Vinoshipper takes
//! Basic auth on every call. Rows share the locations table and are keyed
//! `<address hash>_vinoshipper`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cache::ResultCache;
use crate::domain::{Address, CacheKey};
use crate::vinoshipper::{AccessPointRequest, VinoshipperClient, VinoshipperError};

use super::{LookupError, LookupOutcome, RESULT_TTL};

/// Key suffix separating access-point rows from UPS rows.
pub const ACCESS_POINT_SUFFIX: &str = "vinoshipper";

/// The upstream call an access-point lookup needs.
#[async_trait]
pub trait AccessPointApi: Send + Sync {
    async fn access_points(
        &self,
        request: &AccessPointRequest,
    ) -> Result<Vec<Value>, VinoshipperError>;
}

#[async_trait]
impl AccessPointApi for VinoshipperClient {
    async fn access_points(
        &self,
        request: &AccessPointRequest,
    ) -> Result<Vec<Value>, VinoshipperError> {
        VinoshipperClient::access_points(self, request).await
    }
}

/// Access-point lookup through Vinoshipper.
#[derive(Clone)]
pub struct AccessPointLookup {
    api: Arc<dyn AccessPointApi>,
    results: ResultCache,
    ttl: Duration,
}

impl AccessPointLookup {
    pub fn new(api: Arc<dyn AccessPointApi>, results: ResultCache) -> Self {
        Self {
            api,
            results,
            ttl: RESULT_TTL,
        }
    }

    /// Find access points near `address`. Results are passed through as
    /// Vinoshipper sends them.
    pub async fn lookup(
        &self,
        address: &Address,
        phone_number: &str,
    ) -> Result<LookupOutcome<Value>, LookupError> {
        info!(city = %address.city, state = %address.state, "Starting Vinoshipper location search");

        let key = CacheKey::address_hash(address).with_suffix(ACCESS_POINT_SUFFIX);

        if let Some(locations) = self.results.get::<Value>(&key).await {
            info!(location_count = locations.len(), key = %key, "Returning cached Vinoshipper locations");
            return Ok(LookupOutcome {
                locations,
                cached: true,
            });
        }

        let request = AccessPointRequest::new(address, phone_number);
        let locations = self.api.access_points(&request).await.map_err(|e| {
            error!(error = %e, status = ?e.status(), "Error fetching access points from Vinoshipper");
            LookupError::from_access_points(e)
        })?;

        if locations.is_empty() {
            warn!(key = %key, "No Vinoshipper locations found, skipping cache");
        } else if let Err(e) = self.results.put(&key, address, &locations, self.ttl).await {
            warn!(key = %key, error = %e, "Failed to cache Vinoshipper locations");
        }

        Ok(LookupOutcome {
            locations,
            cached: false,
        })
    }
}
