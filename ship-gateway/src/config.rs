//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ups::UpsEnvironment;
use crate::vinoshipper::{DEFAULT_BASE_URL, DEFAULT_PRODUCER_ID};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_SYNC_PRODUCT: &str = "158960";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Table names in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub tokens: String,
    pub locations: String,
    pub compliance: String,
    pub sync: String,
}

/// Everything the server needs at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ups_env: UpsEnvironment,
    pub ups_auth_url: Option<String>,
    pub ups_locator_url: Option<String>,
    pub ups_client_id: Option<String>,
    pub ups_client_secret: Option<String>,
    pub tables: Tables,
    pub vinoshipper_url: String,
    pub vinoshipper_username: String,
    pub vinoshipper_password: String,
    pub vinoshipper_producer_id: String,
    pub shopify_domain: String,
    pub shopify_access_token: String,
    /// Feed products synced by `/sync/products`; empty means the whole feed
    pub sync_product_ids: Vec<String>,
    /// Root of the JSON file store; `None` keeps everything in memory
    pub store_dir: Option<PathBuf>,
    pub bind_addr: SocketAddr,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let bind = or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
        })?;

        let timeout = or("HTTP_TIMEOUT_SECS", "30");
        let http_timeout_secs = timeout.parse().map_err(|_| ConfigError::Invalid {
            name: "HTTP_TIMEOUT_SECS",
            value: timeout.clone(),
        })?;

        let sync_product_ids = or("SYNC_PRODUCT_IDS", DEFAULT_SYNC_PRODUCT)
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "*")
            .map(str::to_string)
            .collect();

        Ok(Self {
            ups_env: UpsEnvironment::from_name(&or("UPS_ENV", "development")),
            ups_auth_url: var("UPS_AUTH_URL"),
            ups_locator_url: var("UPS_BASE_URL"),
            ups_client_id: var("UPS_CLIENT_ID"),
            ups_client_secret: var("UPS_CLIENT_SECRET"),
            tables: Tables {
                tokens: or("TOKEN_TABLE", "UpsTokens"),
                locations: or("LOCATIONS_TABLE", "UpsLocations"),
                compliance: or("COMPLIANCE_CACHE_TABLE", "ComplianceCache"),
                sync: or("SYNC_TABLE", "ProductSyncTable"),
            },
            vinoshipper_url: or("VINOSHIPPER_API_URL", DEFAULT_BASE_URL),
            vinoshipper_username: or("VINOSHIPPER_USERNAME", ""),
            vinoshipper_password: or("VINOSHIPPER_PASSWORD", ""),
            vinoshipper_producer_id: or("VINOSHIPPER_PRODUCER_ID", DEFAULT_PRODUCER_ID),
            shopify_domain: or("SHOPIFY_DOMAIN", ""),
            shopify_access_token: or("SHOPIFY_ACCESS_TOKEN", ""),
            sync_product_ids,
            store_dir: var("STORE_DIR").map(PathBuf::from),
            bind_addr,
            http_timeout_secs,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("ups_env", &self.ups_env)
            .field("ups_client_id", &self.ups_client_id)
            .field("tables", &self.tables)
            .field("vinoshipper_url", &self.vinoshipper_url)
            .field("vinoshipper_producer_id", &self.vinoshipper_producer_id)
            .field("shopify_domain", &self.shopify_domain)
            .field("store_dir", &self.store_dir)
            .field("bind_addr", &self.bind_addr)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.ups_env, UpsEnvironment::Development);
        assert_eq!(config.ups_client_id, None);
        assert_eq!(config.tables.tokens, "UpsTokens");
        assert_eq!(config.tables.locations, "UpsLocations");
        assert_eq!(config.tables.compliance, "ComplianceCache");
        assert_eq!(config.tables.sync, "ProductSyncTable");
        assert_eq!(config.vinoshipper_url, "https://vinoshipper.com/api/v3");
        assert_eq!(config.vinoshipper_producer_id, "2212");
        assert_eq!(config.sync_product_ids, vec!["158960".to_string()]);
        assert_eq!(config.store_dir, None);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("UPS_ENV", "production"),
            ("UPS_CLIENT_ID", "id"),
            ("UPS_CLIENT_SECRET", "  "),
            ("TOKEN_TABLE", "Tokens"),
            ("SYNC_PRODUCT_IDS", "1, 2,"),
            ("STORE_DIR", "/var/lib/gateway"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();

        assert_eq!(config.ups_env, UpsEnvironment::Production);
        assert_eq!(config.ups_client_id.as_deref(), Some("id"));
        assert_eq!(config.ups_client_secret, None);
        assert_eq!(config.tables.tokens, "Tokens");
        assert_eq!(config.sync_product_ids, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(config.store_dir, Some(PathBuf::from("/var/lib/gateway")));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn whole_feed_and_bad_values() {
        assert!(config(&[("SYNC_PRODUCT_IDS", "*")])
            .unwrap()
            .sync_product_ids
            .is_empty());
        assert!(matches!(
            config(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
        assert!(config(&[("HTTP_TIMEOUT_SECS", "soon")]).is_err());
    }
}
