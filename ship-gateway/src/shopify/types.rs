//! Shopify Admin API DTOs.
//!
//! Only the fields this service reads are modelled; Shopify sends many more.
//! Money amounts arrive as decimal strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An order, as delivered by the order webhooks and `orders.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyOrder {
    pub id: u64,
    pub order_number: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub total_price: Option<String>,
    pub total_tax: Option<String>,
    pub fulfillment_status: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl ShopifyOrder {
    /// Value of a checkout note attribute, rendered as text.
    pub fn note(&self, name: &str) -> Option<String> {
        self.note_attributes
            .iter()
            .find(|attr| attr.name == name)
            .and_then(|attr| match attr.value.as_ref()? {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub province_code: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub sku: Option<String>,
    pub quantity: u32,
    pub price: Option<String>,
    #[serde(default)]
    pub requires_shipping: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderList {
    #[serde(default)]
    pub orders: Vec<ShopifyOrder>,
}

/// A product to create through the REST API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
    pub handle: Option<String>,
    pub status: String,
    pub options: Vec<ProductOption>,
    pub variants: Vec<NewVariant>,
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVariant {
    pub option1: String,
    /// Decimal string with two places
    pub price: String,
    pub sku: String,
    pub inventory_management: String,
    pub inventory_policy: String,
    pub fulfillment_service: String,
    pub weight: f64,
    pub weight_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductImage {
    pub src: String,
    pub alt: String,
}

/// The parts of a created product that are recorded after a sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopifyProductRef {
    pub id: u64,
    pub handle: Option<String>,
    #[serde(default)]
    pub variants: Vec<ShopifyVariantRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopifyVariantRef {
    pub id: u64,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductEnvelope {
    pub product: ShopifyProductRef,
}

/// Tracking details for a new fulfillment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fulfillment {
    pub tracking_number: Option<String>,
    pub tracking_company: String,
    pub tracking_urls: Vec<String>,
    pub notify_customer: bool,
    pub line_items: Vec<FulfillmentLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentLineItem {
    pub id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedFulfillment {
    pub id: u64,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentEnvelope {
    pub fulfillment: CreatedFulfillment,
}

/// Customer fields written when tagging a customer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerUpdate {
    /// Numeric customer id; the GraphQL gid is built from it
    pub customer_id: String,
    pub tag: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<MailingAddress>,
}

/// GraphQL `MailingAddressInput`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
    pub phone: String,
    pub country_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_note_attributes() {
        let order: ShopifyOrder = serde_json::from_value(json!({
            "id": 1,
            "note_attributes": [
                {"name": "UPS_Access_Point_ID", "value": "U123"},
                {"name": "Shipping_Class", "value": 2},
                {"name": "Empty", "value": null}
            ]
        }))
        .unwrap();

        assert_eq!(order.note("UPS_Access_Point_ID").as_deref(), Some("U123"));
        assert_eq!(order.note("Shipping_Class").as_deref(), Some("2"));
        assert_eq!(order.note("Empty"), None);
        assert_eq!(order.note("Missing"), None);
        assert!(order.line_items.is_empty());
    }
}
