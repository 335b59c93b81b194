//! Shipping compliance check.
//!
//! Asks Vinoshipper whether an order may ship to an address. Compliant
//! answers are cached per customer and ship-to address without expiry, and
//! the Shopify customer is tagged `compliant`.

use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::cache::ComplianceCache;
use crate::domain::field_text;
use crate::shopify::{CustomerUpdate, MailingAddress, ShopifyClient};
use crate::vinoshipper::{VinoshipperClient, VinoshipperError};

/// Tag applied to customers cleared to receive shipments.
pub const COMPLIANT_TAG: &str = "compliant";

const CUSTOMER_FIELDS: [&str; 1] = ["email"];
const ADDRESS_FIELDS: [&str; 4] = ["street1", "city", "postalCode", "stateCode"];

/// Errors from a compliance check.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("Invalid input. Required fields are missing.")]
    InvalidInput,

    #[error(transparent)]
    Upstream(#[from] VinoshipperError),
}

impl ComplianceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ComplianceError::InvalidInput => 400,
            ComplianceError::Upstream(_) => 500,
        }
    }
}

/// Response status and body of a compliance check.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceOutcome {
    pub status: u16,
    pub body: Value,
}

/// Whether `body` carries everything a compliance check needs.
pub fn is_valid_request(body: &Value) -> bool {
    let has_all = |object: Option<&Value>, fields: &[&str]| {
        object.is_some_and(|o| fields.iter().all(|f| field_text(o, f).is_some()))
    };

    let customer = body.get("customer");
    let first_product_id = body
        .get("products")
        .and_then(Value::as_array)
        .and_then(|products| products.first())
        .is_some_and(|p| field_text(p, "productId").is_some());

    has_all(customer, &CUSTOMER_FIELDS)
        && has_all(customer.and_then(|c| c.get("address")), &ADDRESS_FIELDS)
        && has_all(body.get("shipToAddress"), &ADDRESS_FIELDS)
        && first_product_id
}

/// Cache key for a customer shipping to an address.
pub fn customer_key(body: &Value) -> String {
    let text = |pointer: &str| {
        body.pointer(pointer)
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default()
    };

    [
        text("/customer/email"),
        text("/shipToAddress/street1"),
        text("/shipToAddress/city"),
        text("/shipToAddress/postalCode"),
        text("/shipToAddress/stateCode"),
    ]
    .join("|")
}

/// Compliance check flow.
#[derive(Clone)]
pub struct ComplianceService {
    vinoshipper: VinoshipperClient,
    shopify: ShopifyClient,
    cache: ComplianceCache,
}

impl ComplianceService {
    pub fn new(vinoshipper: VinoshipperClient, shopify: ShopifyClient, cache: ComplianceCache) -> Self {
        Self {
            vinoshipper,
            shopify,
            cache,
        }
    }

    /// Check `body`, answering from the cache when the customer was already
    /// found compliant.
    pub async fn check(&self, body: &Value) -> Result<ComplianceOutcome, ComplianceError> {
        if !is_valid_request(body) {
            warn!("Validation failed for compliance request");
            return Err(ComplianceError::InvalidInput);
        }

        let key = customer_key(body);

        if let Some(record) = self.cache.get(&key).await {
            info!("Cache hit, returning cached compliance result");
            return Ok(ComplianceOutcome {
                status: 200,
                body: json!({"cached": true, "compliant": true, "details": record.compliance}),
            });
        }

        let check = self.vinoshipper.check_compliance(body).await.inspect_err(|e| {
            error!(error = %e, "Vinoshipper compliance check failed")
        })?;
        let compliant = check.is_compliant();

        if compliant {
            if let Err(e) = self.cache.save(&key, &check.body).await {
                error!(error = %e, "Failed to save compliance result");
            }
            self.tag_customer(body).await;
        } else {
            info!("Order is not compliant, not caching");
        }

        Ok(ComplianceOutcome {
            status: check.status,
            body: json!({"cached": false, "compliant": compliant, "details": check.body}),
        })
    }

    /// Tag the Shopify customer. Failures are logged only.
    async fn tag_customer(&self, body: &Value) {
        let Some(update) = customer_update(body) else {
            warn!("No shopifyCustomerId in request, not tagging customer");
            return;
        };

        match self.shopify.tag_customer(&update).await {
            Ok(_) => info!(customer_id = %update.customer_id, "Tagged Shopify customer as compliant"),
            Err(e) => error!(customer_id = %update.customer_id, error = %e, "Failed to tag Shopify customer"),
        }
    }
}

/// Build the Shopify customer update for a compliant request.
fn customer_update(body: &Value) -> Option<CustomerUpdate> {
    let text = |pointer: &str| {
        body.pointer(pointer)
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default()
    };

    let customer_id = text("/customer/shopifyCustomerId");
    if customer_id.is_empty() {
        return None;
    }

    let phone = format!(
        "{}{}",
        text("/shipToAddress/phone/country"),
        text("/shipToAddress/phone/number")
    );
    let or_us = |s: String| if s.is_empty() { "US".to_string() } else { s };

    let first_name = text("/customer/firstName");
    let last_name = text("/customer/lastName");

    Some(CustomerUpdate {
        customer_id,
        tag: COMPLIANT_TAG.to_string(),
        first_name: first_name.clone(),
        last_name: last_name.clone(),
        phone: phone.clone(),
        address: Some(MailingAddress {
            first_name,
            last_name,
            address1: text("/customer/address/street1"),
            address2: text("/customer/address/street2"),
            city: text("/customer/address/city"),
            province: text("/customer/address/stateCode"),
            country: or_us(text("/customer/address/country")),
            zip: text("/customer/address/postalCode"),
            phone,
            country_code: or_us(text("/shipToAddress/country")),
        }),
    })
}
