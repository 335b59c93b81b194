use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::shopify::{LineItem, ShopifyOrder};
use crate::vinoshipper::{
    CustomerAddress, OrderCustomer, OrderProduct, Phone, ShipToAddress, ShippingRate,
    VinoshipperClient, VinoshipperOrder,
};

use super::{ORDER_NUMBER_PREFIX, WebhookError};

const ACCESS_POINT_NOTE: &str = "UPS_Access_Point_ID";
const SHIPPING_CLASS_NOTE: &str = "Shipping_Class";
const DEFAULT_RATE_CODE: &str = "03";
const SHIPPING_FEE_SKU: &str = "shipping_and_handling_fee";

/// Shopify order webhook topics this service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTopic {
    Create,
    Updated,
    Cancelled,
    Fulfilled,
}

impl OrderTopic {
    /// Parse an `X-Shopify-Topic` header value, ignoring case.
    pub fn parse(topic: &str) -> Option<Self> {
        match topic.trim().to_ascii_lowercase().as_str() {
            "orders/create" => Some(OrderTopic::Create),
            "orders/updated" => Some(OrderTopic::Updated),
            "orders/cancelled" => Some(OrderTopic::Cancelled),
            "orders/fulfilled" => Some(OrderTopic::Fulfilled),
            _ => None,
        }
    }
}

/// Vinoshipper product id carried in a line item sku.
///
/// Skus are either `<anything>:<id>` or the bare id.
pub fn product_id(sku: &str) -> Option<u64> {
    sku.split(':')
        .nth(1)
        .and_then(|id| id.trim().parse().ok())
        .or_else(|| sku.trim().parse().ok())
}

fn money(amount: Option<&str>) -> f64 {
    amount.and_then(|a| a.trim().parse().ok()).unwrap_or(0.0)
}

fn order_product(item: &LineItem) -> Result<OrderProduct, WebhookError> {
    let sku = item.sku.as_deref().unwrap_or_default();
    let product_id = product_id(sku).ok_or_else(|| {
        WebhookError::InvalidOrder(format!(
            "line item {} has no Vinoshipper product id in sku {sku:?}",
            item.id
        ))
    })?;

    Ok(OrderProduct {
        product_id,
        quantity: item.quantity,
        price: money(item.price.as_deref()),
    })
}

/// Build the Vinoshipper order for a new Shopify order.
pub fn build_order(order: &ShopifyOrder) -> Result<VinoshipperOrder, WebhookError> {
    let address = order
        .shipping_address
        .as_ref()
        .ok_or_else(|| WebhookError::InvalidOrder("order has no shipping address".into()))?;
    let order_number = order
        .order_number
        .ok_or_else(|| WebhookError::InvalidOrder("order has no order_number".into()))?;

    let access_point = order.note(ACCESS_POINT_NOTE);
    let rate_code = order
        .note(SHIPPING_CLASS_NOTE)
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| DEFAULT_RATE_CODE.to_string());

    let products = order
        .line_items
        .iter()
        .filter(|item| item.requires_shipping)
        .map(order_product)
        .collect::<Result<Vec<_>, _>>()?;

    let shipping_price = order
        .line_items
        .iter()
        .filter(|item| item.sku.as_deref() == Some(SHIPPING_FEE_SKU))
        .map(|item| money(item.price.as_deref()) * f64::from(item.quantity))
        .sum();

    Ok(VinoshipperOrder {
        paid: Some(true),
        customer: OrderCustomer {
            address: CustomerAddress {
                street1: address.address1.clone(),
                city: address.city.clone(),
                postal_code: address.zip.clone(),
                state_code: address.province_code.clone(),
            },
            email: order.email.clone(),
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            phone: address.phone.clone(),
        },
        ship_to_address: ShipToAddress {
            country: address.country_code.clone(),
            phone: Phone {
                number: address.phone.clone(),
                country: 1,
            },
            postal_code: address.zip.clone(),
            state_code: address.province_code.clone(),
            city: address.city.clone(),
            street1: address.address1.clone(),
            street2: access_point.as_ref().map(|id| format!(".D2R.{id}")),
            ups_access_point_id: access_point,
        },
        shipping_rate: ShippingRate {
            rate_code,
            carrier: "UPS".to_string(),
        },
        products,
        product_id_type: "VS_ID".to_string(),
        order_number: format!("{ORDER_NUMBER_PREFIX}{order_number}"),
        order_date: order.created_at.clone(),
        total_price: money(order.total_price.as_deref()),
        shipping_price,
        tax: money(order.total_tax.as_deref()),
        status: None,
    })
}

/// Handler for Shopify order webhooks.
#[derive(Clone)]
pub struct ShopifyOrderWebhook {
    vinoshipper: VinoshipperClient,
}

impl ShopifyOrderWebhook {
    pub fn new(vinoshipper: VinoshipperClient) -> Self {
        Self { vinoshipper }
    }

    /// Handle one delivery. `body` is echoed back as `shopifyOrder`.
    pub async fn handle(&self, topic: Option<&str>, body: Value) -> Result<Value, WebhookError> {
        let raw_topic = topic.unwrap_or_default();
        info!(
            topic = raw_topic,
            order_id = %body["id"],
            order_number = %body["order_number"],
            "Processing Shopify webhook"
        );

        let Some(topic) = OrderTopic::parse(raw_topic) else {
            warn!(topic = raw_topic, "Unsupported webhook topic");
            return Err(WebhookError::UnsupportedTopic(raw_topic.to_string()));
        };

        let message = match topic {
            OrderTopic::Create => {
                let order: ShopifyOrder = serde_json::from_value(body.clone())
                    .map_err(|e| WebhookError::InvalidOrder(e.to_string()))?;
                let vinoshipper_order = build_order(&order)?;

                info!(
                    order_number = %vinoshipper_order.order_number,
                    product_count = vinoshipper_order.products.len(),
                    total_price = vinoshipper_order.total_price,
                    shipping_price = vinoshipper_order.shipping_price,
                    "Prepared Vinoshipper order payload"
                );

                let created = self
                    .vinoshipper
                    .create_order(&vinoshipper_order)
                    .await
                    .inspect_err(|e| {
                        error!(shopify_order_id = order.id, error = %e, "Error processing webhook")
                    })?;

                return Ok(json!({
                    "message": "Order created successfully",
                    "shopifyOrder": body,
                    "vinoshipperOrder": created,
                }));
            }
            OrderTopic::Updated => "Order updated successfully",
            OrderTopic::Cancelled => "Order cancelled successfully",
            OrderTopic::Fulfilled => "Order fulfilled successfully",
        };

        info!(?topic, "Acknowledged Shopify webhook");
        Ok(json!({"message": message, "shopifyOrder": body}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vinoshipper::VinoshipperConfig;
    use mockito::Matcher;

    fn order_body() -> Value {
        json!({
            "id": 820982911946154500u64,
            "order_number": 1001,
            "email": "ana@example.com",
            "created_at": "2025-05-01T10:00:00-04:00",
            "total_price": "54.50",
            "total_tax": "3.25",
            "shipping_address": {
                "first_name": "Ana", "last_name": "Lopez", "address1": "5 Oak",
                "city": "Decatur", "zip": "30030", "province_code": "GA",
                "country_code": "US", "phone": "4045550100"
            },
            "note_attributes": [
                {"name": "UPS_Access_Point_ID", "value": "U12345"},
                {"name": "Shipping_Class", "value": "02"}
            ],
            "line_items": [
                {"id": 1, "sku": "wine:158960", "quantity": 2, "price": "20.00", "requires_shipping": true},
                {"id": 2, "sku": "158961", "quantity": 1, "price": "9.50", "requires_shipping": true},
                {"id": 3, "sku": "shipping_and_handling_fee", "quantity": 1, "price": "5.00", "requires_shipping": false}
            ]
        })
    }

    fn webhook(server: &mockito::ServerGuard) -> ShopifyOrderWebhook {
        ShopifyOrderWebhook::new(
            VinoshipperClient::new(VinoshipperConfig::new("u", "p").with_base_url(server.url()))
                .unwrap(),
        )
    }

    #[test]
    fn topics() {
        assert_eq!(OrderTopic::parse("orders/create"), Some(OrderTopic::Create));
        assert_eq!(OrderTopic::parse("Orders/Fulfilled"), Some(OrderTopic::Fulfilled));
        assert_eq!(OrderTopic::parse("products/create"), None);
    }

    #[test]
    fn sku_product_ids() {
        assert_eq!(product_id("wine:158960"), Some(158960));
        assert_eq!(product_id("158960"), Some(158960));
        assert_eq!(product_id("abc:xyz"), None);
        assert_eq!(product_id(""), None);
    }

    #[test]
    fn builds_vinoshipper_order() {
        let order: ShopifyOrder = serde_json::from_value(order_body()).unwrap();
        let built = build_order(&order).unwrap();

        assert_eq!(built.order_number, "RDW-SHPFY-1001");
        assert_eq!(built.paid, Some(true));
        assert_eq!(built.ship_to_address.street2.as_deref(), Some(".D2R.U12345"));
        assert_eq!(built.ship_to_address.ups_access_point_id.as_deref(), Some("U12345"));
        assert_eq!(built.shipping_rate.rate_code, "02");
        assert_eq!(built.products.len(), 2);
        assert_eq!(built.products[0].product_id, 158960);
        assert_eq!(built.products[0].quantity, 2);
        assert_eq!(built.products[1].product_id, 158961);
        assert_eq!(built.total_price, 54.5);
        assert_eq!(built.shipping_price, 5.0);
        assert_eq!(built.tax, 3.25);
    }

    #[test]
    fn default_rate_code_and_no_access_point() {
        let mut body = order_body();
        body["note_attributes"] = json!([]);
        let order: ShopifyOrder = serde_json::from_value(body).unwrap();
        let built = build_order(&order).unwrap();

        assert_eq!(built.shipping_rate.rate_code, "03");
        assert_eq!(built.ship_to_address.street2, None);
    }

    #[test]
    fn unparseable_sku_is_rejected() {
        let mut body = order_body();
        body["line_items"][0]["sku"] = json!("gift-card");
        let order: ShopifyOrder = serde_json::from_value(body).unwrap();
        assert!(matches!(build_order(&order), Err(WebhookError::InvalidOrder(_))));
    }

    #[tokio::test]
    async fn create_posts_order() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/p/orders")
            .match_body(Matcher::PartialJson(json!({
                "orderNumber": "RDW-SHPFY-1001",
                "productIdType": "VS_ID",
                "shipToAddress": {"upsAccessPointId": "U12345"}
            })))
            .with_status(200)
            .with_body(r#"{"id":9001}"#)
            .create_async()
            .await;

        let response = webhook(&server)
            .handle(Some("orders/create"), order_body())
            .await
            .unwrap();

        assert_eq!(response["message"], "Order created successfully");
        assert_eq!(response["vinoshipperOrder"]["id"], 9001);
        assert_eq!(response["shopifyOrder"]["order_number"], 1001);
        create.assert_async().await;
    }

    #[tokio::test]
    async fn other_topics_are_acknowledged() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let hook = webhook(&server);
        let response = hook
            .handle(Some("orders/cancelled"), order_body())
            .await
            .unwrap();
        assert_eq!(response["message"], "Order cancelled successfully");

        let err = hook
            .handle(Some("carts/update"), order_body())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = hook.handle(None, order_body()).await.unwrap_err();
        assert!(matches!(err, WebhookError::UnsupportedTopic(t) if t.is_empty()));

        never.assert_async().await;
    }

    #[tokio::test]
    async fn vinoshipper_failure_is_500() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/p/orders")
            .with_status(422)
            .with_body(r#"{"error":{"errors":["bad product"]}}"#)
            .create_async()
            .await;

        let err = webhook(&server)
            .handle(Some("orders/create"), order_body())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
