//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::{ComplianceCache, CredentialCache, ResultCache, SyncStatusStore};
use crate::compliance::ComplianceService;
use crate::config::AppConfig;
use crate::lookup::{ACCESS_POINT_SUFFIX, AccessPointLookup, ApiCredentials, LocationLookup};
use crate::shopify::{ShopifyClient, ShopifyConfig, ShopifyError};
use crate::store::KeyValueStore;
use crate::sync::ProductSync;
use crate::ups::{UpsClient, UpsConfig, UpsError};
use crate::vinoshipper::{VinoshipperClient, VinoshipperConfig, VinoshipperError};
use crate::webhook::{ShopifyOrderWebhook, VinoshipperOrderWebhook};

/// A client could not be built at start-up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("UPS client: {0}")]
    Ups(#[from] UpsError),

    #[error("Vinoshipper client: {0}")]
    Vinoshipper(#[from] VinoshipperError),

    #[error("Shopify client: {0}")]
    Shopify(#[from] ShopifyError),
}

/// Shared application state.
///
/// One service per endpoint; all of them share the same store.
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationLookup>,
    pub access_points: Arc<AccessPointLookup>,
    pub compliance: Arc<ComplianceService>,
    pub shopify_orders: Arc<ShopifyOrderWebhook>,
    pub vinoshipper_orders: Arc<VinoshipperOrderWebhook>,
    pub product_sync: Arc<ProductSync>,
}

impl AppState {
    /// Build every client and service from configuration.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StartupError> {
        let mut ups_config = UpsConfig::new(config.ups_env).with_timeout(config.http_timeout_secs);
        if let Some(url) = &config.ups_auth_url {
            ups_config = ups_config.with_auth_url(url);
        }
        if let Some(url) = &config.ups_locator_url {
            ups_config = ups_config.with_locator_url(url);
        }
        let ups = UpsClient::new(ups_config)?;

        let vinoshipper = VinoshipperClient::new(
            VinoshipperConfig::new(&config.vinoshipper_username, &config.vinoshipper_password)
                .with_base_url(&config.vinoshipper_url)
                .with_producer_id(&config.vinoshipper_producer_id)
                .with_timeout(config.http_timeout_secs),
        )?;

        let shopify = ShopifyClient::new(
            ShopifyConfig::new(&config.shopify_domain, &config.shopify_access_token)
                .with_timeout(config.http_timeout_secs),
        )?;

        let tables = &config.tables;
        let locations = LocationLookup::new(
            Arc::new(ups),
            CredentialCache::new(store.clone(), &tables.tokens),
            ResultCache::new(store.clone(), &tables.locations),
            ApiCredentials::from_parts(
                config.ups_client_id.clone(),
                config.ups_client_secret.clone(),
            ),
        );
        let access_points = AccessPointLookup::new(
            Arc::new(vinoshipper.clone()),
            ResultCache::new(store.clone(), &tables.locations).with_source(ACCESS_POINT_SUFFIX),
        );
        let compliance = ComplianceService::new(
            vinoshipper.clone(),
            shopify.clone(),
            ComplianceCache::new(store.clone(), &tables.compliance),
        );
        let product_sync = ProductSync::new(
            vinoshipper.clone(),
            shopify.clone(),
            SyncStatusStore::new(store, &tables.sync),
            config.sync_product_ids.clone(),
        );

        Ok(Self::new(
            locations,
            access_points,
            compliance,
            ShopifyOrderWebhook::new(vinoshipper),
            VinoshipperOrderWebhook::new(shopify),
            product_sync,
        ))
    }

    /// Create a new app state from prebuilt services.
    pub fn new(
        locations: LocationLookup,
        access_points: AccessPointLookup,
        compliance: ComplianceService,
        shopify_orders: ShopifyOrderWebhook,
        vinoshipper_orders: VinoshipperOrderWebhook,
        product_sync: ProductSync,
    ) -> Self {
        Self {
            locations: Arc::new(locations),
            access_points: Arc::new(access_points),
            compliance: Arc::new(compliance),
            shopify_orders: Arc::new(shopify_orders),
            vinoshipper_orders: Arc::new(vinoshipper_orders),
            product_sync: Arc::new(product_sync),
        }
    }
}
