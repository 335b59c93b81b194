use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::shopify::{Fulfillment, FulfillmentLineItem, ShopifyClient};

use super::{ORDER_NUMBER_PREFIX, WebhookError};

/// Order status update posted by Vinoshipper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinoshipperOrderEvent {
    pub id: Value,
    pub order_number: String,
    pub status: Option<String>,
    #[serde(alias = "tracking_number")]
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    #[serde(alias = "tracking_url")]
    pub tracking_url: Option<String>,
}

impl VinoshipperOrderEvent {
    /// Parse a webhook body, requiring `id` and `orderNumber`.
    pub fn from_body(body: &Value) -> Result<Self, WebhookError> {
        let present = |name: &str| body.get(name).is_some_and(|v| !v.is_null());
        if !present("id") || !present("orderNumber") {
            return Err(WebhookError::MissingFields);
        }
        serde_json::from_value(body.clone()).map_err(|e| WebhookError::InvalidOrder(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfilmentAction {
    Fulfilled,
    Cancelled,
    Updated,
    UnknownStatus,
}

/// What was done with a Vinoshipper status update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfilmentResult {
    pub success: bool,
    pub action: FulfilmentAction,
    pub shopify_order_number: String,
    pub vinoshipper_order_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopify_fulfillment_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Shopify order number embedded in a Vinoshipper order number.
pub fn shopify_order_number(order_number: &str) -> Option<&str> {
    let start = order_number.find(ORDER_NUMBER_PREFIX)? + ORDER_NUMBER_PREFIX.len();
    let rest = &order_number[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Handler for Vinoshipper order webhooks.
#[derive(Clone)]
pub struct VinoshipperOrderWebhook {
    shopify: ShopifyClient,
}

impl VinoshipperOrderWebhook {
    pub fn new(shopify: ShopifyClient) -> Self {
        Self { shopify }
    }

    pub async fn process(&self, event: &VinoshipperOrderEvent) -> Result<FulfilmentResult, WebhookError> {
        info!(
            vinoshipper_order_id = %event.id,
            order_number = %event.order_number,
            status = ?event.status,
            "Processing Vinoshipper order update"
        );

        let shopify_order_number = shopify_order_number(&event.order_number)
            .ok_or_else(|| {
                warn!(order_number = %event.order_number, "Invalid Vinoshipper order number format");
                WebhookError::InvalidOrderNumber(event.order_number.clone())
            })?
            .to_string();

        let result = |action| FulfilmentResult {
            success: true,
            action,
            shopify_order_number: shopify_order_number.clone(),
            vinoshipper_order_id: event.id.clone(),
            tracking_number: None,
            shopify_fulfillment_id: None,
            status: None,
            message: None,
        };

        let status = event.status.as_deref().map(str::to_ascii_lowercase);
        match status.as_deref() {
            Some("shipped" | "fulfilled") => {
                let fulfillment_id = self.fulfil(&shopify_order_number, event).await?;
                Ok(FulfilmentResult {
                    tracking_number: event.tracking_number.clone(),
                    shopify_fulfillment_id: Some(fulfillment_id),
                    ..result(FulfilmentAction::Fulfilled)
                })
            }
            Some("cancelled") => {
                info!(shopify_order_number = %shopify_order_number, "Processing cancelled order");
                Ok(FulfilmentResult {
                    message: Some("Order cancelled in Vinoshipper".to_string()),
                    ..result(FulfilmentAction::Cancelled)
                })
            }
            Some("pending" | "processing") => Ok(FulfilmentResult {
                status: event.status.clone(),
                ..result(FulfilmentAction::Updated)
            }),
            _ => {
                warn!(status = ?event.status, "Unknown order status");
                Ok(FulfilmentResult {
                    status: event.status.clone(),
                    ..result(FulfilmentAction::UnknownStatus)
                })
            }
        }
    }

    /// Create a Shopify fulfillment covering every line item.
    async fn fulfil(&self, order_name: &str, event: &VinoshipperOrderEvent) -> Result<u64, WebhookError> {
        let order = self.shopify.find_order_by_name(order_name).await?;

        let fulfillment = Fulfillment {
            tracking_number: event.tracking_number.clone(),
            tracking_company: event.carrier.clone().unwrap_or_else(|| "UPS".to_string()),
            tracking_urls: event.tracking_url.iter().cloned().collect(),
            notify_customer: true,
            line_items: order
                .line_items
                .iter()
                .map(|item| FulfillmentLineItem {
                    id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
        };

        let created = self.shopify.create_fulfillment(order.id, &fulfillment).await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::ShopifyConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn webhook(server: &mockito::ServerGuard) -> VinoshipperOrderWebhook {
        VinoshipperOrderWebhook::new(
            ShopifyClient::new(ShopifyConfig::new("shop", "t").with_base_url(server.url())).unwrap(),
        )
    }

    fn event(body: Value) -> VinoshipperOrderEvent {
        VinoshipperOrderEvent::from_body(&body).unwrap()
    }

    #[test]
    fn order_numbers() {
        assert_eq!(shopify_order_number("RDW-SHPFY-1001"), Some("1001"));
        assert_eq!(shopify_order_number("x-RDW-SHPFY-42-b"), Some("42"));
        assert_eq!(shopify_order_number("RDW-SHPFY-"), None);
        assert_eq!(shopify_order_number("1001"), None);
    }

    #[test]
    fn required_fields() {
        assert!(matches!(
            VinoshipperOrderEvent::from_body(&json!({"id": 1})),
            Err(WebhookError::MissingFields)
        ));
        assert!(matches!(
            VinoshipperOrderEvent::from_body(&json!({"orderNumber": "RDW-SHPFY-1", "id": null})),
            Err(WebhookError::MissingFields)
        ));
        let parsed = event(json!({"id": 5, "orderNumber": "RDW-SHPFY-1", "tracking_number": "1Z"}));
        assert_eq!(parsed.tracking_number.as_deref(), Some("1Z"));
    }

    #[tokio::test]
    async fn shipped_order_is_fulfilled() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/api/2025-04/orders.json")
            .match_query(Matcher::UrlEncoded("name".into(), "1001".into()))
            .with_status(200)
            .with_body(r#"{"orders":[{"id":555,"line_items":[{"id":9,"quantity":2},{"id":10,"quantity":1}]}]}"#)
            .create_async()
            .await;
        let fulfil = server
            .mock("POST", "/admin/api/2025-04/orders/555/fulfillments.json")
            .match_body(Matcher::PartialJson(json!({"fulfillment": {
                "tracking_number": "1Z999",
                "tracking_company": "UPS",
                "tracking_urls": ["https://ups.example/1Z999"],
                "notify_customer": true,
                "line_items": [{"id": 9, "quantity": 2}, {"id": 10, "quantity": 1}]
            }})))
            .with_status(201)
            .with_body(r#"{"fulfillment":{"id":777,"tracking_number":"1Z999"}}"#)
            .create_async()
            .await;

        let result = webhook(&server)
            .process(&event(json!({
                "id": 9001,
                "orderNumber": "RDW-SHPFY-1001",
                "status": "Shipped",
                "trackingNumber": "1Z999",
                "trackingUrl": "https://ups.example/1Z999"
            })))
            .await
            .unwrap();

        assert_eq!(result.action, FulfilmentAction::Fulfilled);
        assert_eq!(result.shopify_fulfillment_id, Some(777));
        assert_eq!(result.shopify_order_number, "1001");

        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["action"], "fulfilled");
        assert_eq!(body["vinoshipperOrderId"], 9001);
        fulfil.assert_async().await;
    }

    #[tokio::test]
    async fn non_shipping_statuses() {
        let server = mockito::Server::new_async().await;
        let hook = webhook(&server);

        let cancelled = hook
            .process(&event(json!({"id": 1, "orderNumber": "RDW-SHPFY-7", "status": "cancelled"})))
            .await
            .unwrap();
        assert_eq!(cancelled.action, FulfilmentAction::Cancelled);

        let pending = hook
            .process(&event(json!({"id": 1, "orderNumber": "RDW-SHPFY-7", "status": "processing"})))
            .await
            .unwrap();
        assert_eq!(pending.action, FulfilmentAction::Updated);
        assert_eq!(pending.status.as_deref(), Some("processing"));

        let unknown = hook
            .process(&event(json!({"id": 1, "orderNumber": "RDW-SHPFY-7"})))
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&unknown).unwrap()["action"],
            "unknown_status"
        );
    }

    #[tokio::test]
    async fn bad_order_number_and_missing_order_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/api/2025-04/orders.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"orders":[]}"#)
            .create_async()
            .await;
        let hook = webhook(&server);

        let err = hook
            .process(&event(json!({"id": 1, "orderNumber": "WEB-1", "status": "shipped"})))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::InvalidOrderNumber(_)));

        let err = hook
            .process(&event(json!({"id": 1, "orderNumber": "RDW-SHPFY-8", "status": "shipped"})))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
