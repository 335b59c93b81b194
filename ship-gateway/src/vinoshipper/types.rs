//! Vinoshipper API DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::Address;

/// Body of an access-point search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPointRequest {
    pub street1: String,
    pub city: String,
    pub state_code: String,
    pub postal_code: String,
    pub country: String,
    pub phone_number: String,
}

impl AccessPointRequest {
    pub fn new(address: &Address, phone_number: impl Into<String>) -> Self {
        Self {
            street1: address.street.clone(),
            city: address.city.clone(),
            state_code: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            phone_number: phone_number.into(),
        }
    }
}

/// Response of an access-point search.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPointResponse {
    /// Access points, passed through untouched
    #[serde(default)]
    pub locations: Vec<Value>,
}

/// Outcome of a compliance check.
///
/// Vinoshipper answers non-compliant orders with a non-2xx status and a JSON
/// body, so the status is carried instead of being turned into an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceCheck {
    pub status: u16,
    pub body: Value,
}

impl ComplianceCheck {
    /// Whether Vinoshipper reported `isCompliant: true`.
    pub fn is_compliant(&self) -> bool {
        self.body.get("isCompliant").and_then(Value::as_bool) == Some(true)
    }
}

/// An order as submitted to Vinoshipper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VinoshipperOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    pub customer: OrderCustomer,
    pub ship_to_address: ShipToAddress,
    pub shipping_rate: ShippingRate,
    pub products: Vec<OrderProduct>,
    pub product_id_type: String,
    pub order_number: String,
    pub order_date: Option<String>,
    pub total_price: f64,
    pub shipping_price: f64,
    pub tax: f64,
    /// Only sent on updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub address: CustomerAddress,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddress {
    pub street1: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub state_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipToAddress {
    pub country: Option<String>,
    pub phone: Phone,
    pub postal_code: Option<String>,
    pub state_code: Option<String>,
    pub city: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ups_access_point_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub number: Option<String>,
    /// Dialling code
    pub country: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub rate_code: String,
    pub carrier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product_id: u64,
    pub quantity: u32,
    pub price: f64,
}

/// A product from the producer feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedProduct {
    /// Sent as a number; normalised to a string
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub desc: Option<String>,
    pub product_category: Option<String>,
    pub alcohol: Option<bool>,
    pub url_slug: Option<String>,
    pub price: Option<f64>,
    pub sku: Option<String>,
    pub weight: Option<Weight>,
    pub img: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub lbs: Option<f64>,
}

/// Producer feed listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFeed {
    #[serde(default)]
    pub products: Vec<FeedProduct>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
