use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ship_gateway::config::AppConfig;
use ship_gateway::store::{JsonFileStore, KeyValueStore, MemoryStore};
use ship_gateway::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if config.ups_client_id.is_none() || config.ups_client_secret.is_none() {
        warn!("UPS_CLIENT_ID or UPS_CLIENT_SECRET not set. Location lookups will fail.");
    }
    if config.vinoshipper_username.is_empty() || config.vinoshipper_password.is_empty() {
        warn!("VINOSHIPPER_USERNAME or VINOSHIPPER_PASSWORD not set. Vinoshipper calls will fail.");
    }
    if config.shopify_domain.is_empty() {
        warn!("SHOPIFY_DOMAIN not set. Shopify calls will fail.");
    }

    let store: Arc<dyn KeyValueStore> = match &config.store_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Using JSON file store");
            Arc::new(JsonFileStore::new(dir))
        }
        None => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::default())
        }
    };

    let state = AppState::from_config(&config, store).expect("Failed to build clients");
    let app = create_router(state);

    info!(addr = %config.bind_addr, ups_env = ?config.ups_env, "Shipping gateway listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
