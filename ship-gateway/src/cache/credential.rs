//! Bearer token cache.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::domain::Credential;
use crate::store::{KeyValueStore, StoreError};

use super::{expiry_after, now_millis};

/// Key of the single process-wide token row.
pub const TOKEN_KEY: &str = "ups_api_token";

/// Stored token row.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCredential {
    pub id: String,
    pub access_token: String,
    /// Epoch millis after which the token must not be handed out
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl CachedCredential {
    /// Whether the token may still be used at `now` (epoch millis).
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for CachedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCredential")
            .field("id", &self.id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Cache for the upstream bearer token.
///
/// Concurrent renewals are not coordinated; each write carries a consistent
/// token/expiry pair, so whichever lands last is as good as any other.
#[derive(Clone)]
pub struct CredentialCache {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl CredentialCache {
    /// Create a credential cache over `table` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Return the stored token if it has not expired.
    ///
    /// Store errors and undecodable rows are logged and reported as absent,
    /// which sends the caller down the renewal path.
    pub async fn get_valid(&self) -> Option<CachedCredential> {
        debug!(table = %self.table, key = TOKEN_KEY, "Fetching stored token");

        let item = match self.store.get(&self.table, TOKEN_KEY).await {
            Ok(item) => item?,
            Err(e) => {
                error!(table = %self.table, error = %e, "Error fetching token from store");
                return None;
            }
        };

        let cached: CachedCredential = match serde_json::from_value(item) {
            Ok(cached) => cached,
            Err(e) => {
                error!(table = %self.table, error = %e, "Stored token row is malformed");
                return None;
            }
        };

        if cached.is_valid_at(now_millis()) {
            info!("Valid token found in store");
            Some(cached)
        } else {
            info!(expires_at = cached.expires_at, "Stored token has expired");
            None
        }
    }

    /// Persist `credential`, valid for `ttl` from now.
    ///
    /// Overwrites any previous token. Errors propagate: a token that cannot
    /// be stored will be requested again by the next caller.
    pub async fn store(
        &self,
        credential: &Credential,
        ttl: Duration,
    ) -> Result<CachedCredential, StoreError> {
        let expires_at = expiry_after(now_millis(), ttl);

        let cached = CachedCredential {
            id: TOKEN_KEY.to_string(),
            access_token: credential.access_token.clone(),
            expires_at,
            refresh_token: credential.refresh_token.clone(),
        };

        debug!(table = %self.table, expires_at, "Storing token");

        let item = serde_json::to_value(&cached).map_err(|e| StoreError::Serialization {
            message: e.to_string(),
        })?;

        self.store
            .put(&self.table, TOKEN_KEY, item)
            .await
            .inspect_err(|e| error!(table = %self.table, error = %e, "Error storing token"))?;

        info!("Successfully stored token");
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn cache() -> (Arc<MemoryStore>, CredentialCache) {
        let store = Arc::new(MemoryStore::default());
        let cache = CredentialCache::new(store.clone(), "UpsTokens");
        (store, cache)
    }

    #[tokio::test]
    async fn absent_when_empty() {
        let (_, cache) = cache();
        assert!(cache.get_valid().await.is_none());
    }

    #[tokio::test]
    async fn store_then_get() {
        let (_, cache) = cache();
        let credential = Credential::new("tok", Duration::from_secs(3600));

        let before = now_millis();
        let stored = cache.store(&credential, credential.expires_in).await.unwrap();
        assert!(stored.expires_at >= before + 3_600_000);

        let valid = cache.get_valid().await.unwrap();
        assert_eq!(valid.access_token, "tok");
    }

    #[tokio::test]
    async fn expired_token_is_absent() {
        let (store, cache) = cache();
        store
            .put(
                "UpsTokens",
                TOKEN_KEY,
                json!({"id": TOKEN_KEY, "accessToken": "old", "expiresAt": now_millis() - 1}),
            )
            .await
            .unwrap();

        assert!(cache.get_valid().await.is_none());
    }

    #[tokio::test]
    async fn huge_ttl_stays_valid() {
        let (_, cache) = cache();
        let ttl = Duration::from_secs(18_446_744_073_709_551);
        let credential = Credential::new("tok", ttl);

        let stored = cache.store(&credential, ttl).await.unwrap();
        assert_eq!(stored.expires_at, i64::MAX);
        assert_eq!(cache.get_valid().await.unwrap().access_token, "tok");
    }

    #[tokio::test]
    async fn zero_ttl_never_served() {
        let (_, cache) = cache();
        let credential = Credential::new("tok", Duration::ZERO);
        cache.store(&credential, Duration::ZERO).await.unwrap();

        assert!(cache.get_valid().await.is_none());
    }

    #[tokio::test]
    async fn malformed_row_is_absent() {
        let (store, cache) = cache();
        store
            .put("UpsTokens", TOKEN_KEY, json!({"accessToken": 7}))
            .await
            .unwrap();

        assert!(cache.get_valid().await.is_none());
    }

    #[test]
    fn validity_boundary() {
        let cached = CachedCredential {
            id: TOKEN_KEY.into(),
            access_token: "t".into(),
            expires_at: 1_000,
            refresh_token: None,
        };
        assert!(cached.is_valid_at(999));
        assert!(!cached.is_valid_at(1_000));
    }
}
