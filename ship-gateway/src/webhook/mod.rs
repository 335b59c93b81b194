//! Order webhooks between Shopify and Vinoshipper.
//!
//! Shopify order creation is forwarded to Vinoshipper as a new order;
//! Vinoshipper shipping updates come back as Shopify fulfillments. Orders
//! are linked by the Vinoshipper order number `RDW-SHPFY-<shopify number>`.

mod shopify;
mod vinoshipper;

pub use shopify::{OrderTopic, ShopifyOrderWebhook, build_order, product_id};
pub use vinoshipper::{
    FulfilmentAction, FulfilmentResult, VinoshipperOrderEvent, VinoshipperOrderWebhook,
    shopify_order_number,
};

use crate::shopify::ShopifyError;
use crate::vinoshipper::VinoshipperError;

/// Prefix of Vinoshipper order numbers created from Shopify orders.
pub const ORDER_NUMBER_PREFIX: &str = "RDW-SHPFY-";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Unsupported webhook topic: {0}")]
    UnsupportedTopic(String),

    #[error("Invalid order payload: {0}")]
    InvalidOrder(String),

    #[error("Missing required fields: id, orderNumber")]
    MissingFields,

    #[error("Invalid order number format: {0}")]
    InvalidOrderNumber(String),

    #[error(transparent)]
    Vinoshipper(#[from] VinoshipperError),

    #[error(transparent)]
    Shopify(#[from] ShopifyError),
}

impl WebhookError {
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::UnsupportedTopic(_) | WebhookError::MissingFields => 400,
            _ => 500,
        }
    }
}
