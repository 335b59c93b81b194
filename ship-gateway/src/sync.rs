//! Product sync from the Vinoshipper producer feed into Shopify.
//!
//! Each product is created in Shopify once. The sync table remembers which
//! products succeeded; failed products are retried on the next run.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::cache::{SyncState, SyncStatus, SyncStatusStore};
use crate::shopify::{NewProduct, NewVariant, ProductImage, ProductOption, ShopifyClient};
use crate::vinoshipper::{FeedProduct, VinoshipperClient, VinoshipperError};

const VENDOR: &str = "Rescue Dog Wines";
const DEFAULT_PRODUCT_TYPE: &str = "Misc";
const NON_ALCOHOLIC_TAG: &str = "non-alcoholic";
const KG_PER_LB: f64 = 0.453592;
const DEFAULT_WEIGHT_KG: f64 = 0.45;

/// Failure to read the producer feed. Per-product failures are reported,
/// not returned.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct SyncError(#[from] pub VinoshipperError);

/// A product that could not be created in Shopify.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub product_id: String,
    pub error: String,
}

/// Summary of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<SyncFailure>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn handle(product: &FeedProduct) -> Option<String> {
    product
        .url_slug
        .as_deref()
        .and_then(|slug| slug.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .or_else(|| {
            product.name.as_deref().map(|name| {
                name.to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("-")
            })
        })
}

/// Map a feed product onto a new Shopify product with a single variant.
pub fn to_shopify_product(product: &FeedProduct) -> NewProduct {
    let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());

    let title = non_empty(&product.name)
        .or_else(|| non_empty(&product.display_name))
        .unwrap_or_else(|| "Untitled".to_string());

    let weight = product
        .weight
        .as_ref()
        .and_then(|w| w.lbs)
        .filter(|lbs| *lbs != 0.0)
        .map(|lbs| round2(lbs * KG_PER_LB))
        .unwrap_or(DEFAULT_WEIGHT_KG);

    NewProduct {
        title,
        body_html: format!("<p>{}</p>", product.desc.as_deref().unwrap_or_default()),
        vendor: VENDOR.to_string(),
        product_type: non_empty(&product.product_category)
            .unwrap_or_else(|| DEFAULT_PRODUCT_TYPE.to_string()),
        tags: if product.alcohol == Some(false) {
            NON_ALCOHOLIC_TAG.to_string()
        } else {
            String::new()
        },
        handle: handle(product),
        status: "active".to_string(),
        options: vec![ProductOption {
            name: "Title".to_string(),
            values: vec!["Default".to_string()],
        }],
        variants: vec![NewVariant {
            option1: "Default".to_string(),
            price: format!("{:.2}", product.price.unwrap_or(0.0)),
            sku: product.sku.clone().unwrap_or_default(),
            inventory_management: "shopify".to_string(),
            inventory_policy: "deny".to_string(),
            fulfillment_service: "manual".to_string(),
            weight,
            weight_unit: "kg".to_string(),
        }],
        images: product
            .img
            .iter()
            .map(|src| ProductImage {
                src: src.clone(),
                alt: non_empty(&product.name).unwrap_or_else(|| "Product image".to_string()),
            })
            .collect(),
    }
}

/// Product sync job.
#[derive(Clone)]
pub struct ProductSync {
    vinoshipper: VinoshipperClient,
    shopify: ShopifyClient,
    status: SyncStatusStore,
    /// Feed products to sync; empty syncs the whole feed
    product_ids: Vec<String>,
}

impl ProductSync {
    pub fn new(
        vinoshipper: VinoshipperClient,
        shopify: ShopifyClient,
        status: SyncStatusStore,
        product_ids: Vec<String>,
    ) -> Self {
        Self {
            vinoshipper,
            shopify,
            status,
            product_ids,
        }
    }

    async fn feed(&self) -> Result<Vec<FeedProduct>, VinoshipperError> {
        if self.product_ids.is_empty() {
            return self.vinoshipper.products().await;
        }

        let mut products = Vec::with_capacity(self.product_ids.len());
        for id in &self.product_ids {
            products.push(self.vinoshipper.product(id).await?);
        }
        Ok(products)
    }

    /// Run one sync pass.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let products = self
            .feed()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to sync products"))?;
        info!(product_count = products.len(), "Fetched Vinoshipper products");

        let mut report = SyncReport::default();

        for product in &products {
            let previous = self.status.get(&product.id).await;
            if previous.is_some_and(|s| s.status == SyncState::Success) {
                info!(product_id = %product.id, "Product already synced successfully, skipping");
                report.skipped.push(product.id.clone());
                continue;
            }

            let synced_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let status = match self.shopify.create_product(&to_shopify_product(product)).await {
                Ok(created) => {
                    info!(product_id = %product.id, shopify_id = created.id, "Synced product to Shopify");
                    report.synced.push(product.id.clone());
                    SyncStatus {
                        product_id: product.id.clone(),
                        last_synced_at: synced_at,
                        status: SyncState::Success,
                        shopify_data: Some(created),
                        error: None,
                    }
                }
                Err(e) => {
                    error!(product_id = %product.id, error = %e, "Failed to sync product");
                    report.failed.push(SyncFailure {
                        product_id: product.id.clone(),
                        error: e.to_string(),
                    });
                    SyncStatus {
                        product_id: product.id.clone(),
                        last_synced_at: synced_at,
                        status: SyncState::Failed,
                        shopify_data: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            // Already logged by the store; the next run retries.
            let _ = self.status.put(&status).await;
        }

        info!(
            synced = report.synced.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Product sync finished"
        );
        Ok(report)
    }
}
