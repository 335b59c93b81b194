//! Cached UPS location lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::cache::{CredentialCache, ResultCache};
use crate::domain::{Address, CacheKey, Credential, Location, SearchCriteria};
use crate::ups::{UpsClient, UpsError};

use super::{LookupError, LookupOutcome, RESULT_TTL};

/// The upstream calls a location lookup needs.
///
/// This abstraction allows the orchestrator to be tested with stubs.
#[async_trait]
pub trait LocatorApi: Send + Sync {
    /// Exchange application credentials for a bearer token.
    async fn renew_credential(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credential, UpsError>;

    /// Search for locations around `address`.
    async fn search(
        &self,
        address: &Address,
        access_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Location>, UpsError>;
}

#[async_trait]
impl LocatorApi for UpsClient {
    async fn renew_credential(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Credential, UpsError> {
        UpsClient::renew_credential(self, client_id, client_secret).await
    }

    async fn search(
        &self,
        address: &Address,
        access_token: &str,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Location>, UpsError> {
        UpsClient::search(self, address, access_token, criteria).await
    }
}

/// Long-lived application credentials for the token exchange.
#[derive(Clone)]
pub struct ApiCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ApiCredentials {
    /// Both parts, if both are non-empty.
    pub fn from_parts(client_id: Option<String>, client_secret: Option<String>) -> Option<Self> {
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(Self {
                    client_id,
                    client_secret,
                })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Location lookup: result cache first, then token, then UPS.
///
/// Concurrent misses on the same key are not coalesced; each runs its own
/// upstream call and the last cache write wins.
#[derive(Clone)]
pub struct LocationLookup {
    api: Arc<dyn LocatorApi>,
    credentials: CredentialCache,
    results: ResultCache,
    app_credentials: Option<ApiCredentials>,
    ttl: Duration,
}

impl LocationLookup {
    pub fn new(
        api: Arc<dyn LocatorApi>,
        credentials: CredentialCache,
        results: ResultCache,
        app_credentials: Option<ApiCredentials>,
    ) -> Self {
        Self {
            api,
            credentials,
            results,
            app_credentials,
            ttl: RESULT_TTL,
        }
    }

    /// Override how long fresh results are cached.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Find locations near `address`.
    pub async fn lookup(
        &self,
        address: &Address,
        criteria: &SearchCriteria,
    ) -> Result<LookupOutcome<Location>, LookupError> {
        info!(city = %address.city, state = %address.state, "Starting location search");

        let key = CacheKey::for_search(address, criteria);

        if let Some(locations) = self.results.get::<Location>(&key).await {
            info!(location_count = locations.len(), key = %key, "Returning cached locations");
            return Ok(LookupOutcome {
                locations,
                cached: true,
            });
        }

        let access_token = self.access_token().await?;

        info!("Fetching locations from UPS API");
        let locations = self
            .api
            .search(address, &access_token, criteria)
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching locations from UPS");
                LookupError::from_search(e)
            })?;

        if locations.is_empty() {
            warn!(key = %key, "No locations found, skipping cache");
        } else if let Err(e) = self.results.put(&key, address, &locations, self.ttl).await {
            // The caller still gets the results.
            warn!(key = %key, error = %e, "Failed to cache locations");
        }

        Ok(LookupOutcome {
            locations,
            cached: false,
        })
    }

    /// A usable bearer token, renewing it if the stored one is absent or
    /// expired.
    async fn access_token(&self) -> Result<String, LookupError> {
        if let Some(stored) = self.credentials.get_valid().await {
            debug!("Using stored access token");
            return Ok(stored.access_token);
        }

        info!("No stored token found, requesting new token");

        let Some(app) = &self.app_credentials else {
            error!("UPS credentials not configured");
            return Err(LookupError::ups_unavailable());
        };

        let credential = self
            .api
            .renew_credential(&app.client_id, &app.client_secret)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to obtain access token");
                LookupError::ups_unavailable()
            })?;

        if credential.access_token.is_empty() {
            error!("Token response carried no access token");
            return Err(LookupError::ups_unavailable());
        }

        if let Err(e) = self
            .credentials
            .store(&credential, credential.expires_in)
            .await
        {
            warn!(error = %e, "Could not store access token, using it for this request only");
        }

        Ok(credential.access_token)
    }
}
