//! Vinoshipper HTTP client.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::VinoshipperError;
use super::types::{
    AccessPointRequest, AccessPointResponse, ComplianceCheck, FeedProduct, ProductFeed,
    VinoshipperOrder,
};

/// Default base URL for the Vinoshipper v3 API.
pub const DEFAULT_BASE_URL: &str = "https://vinoshipper.com/api/v3";

/// Default producer whose feed is synced.
pub const DEFAULT_PRODUCER_ID: &str = "2212";

/// Configuration for the Vinoshipper client.
#[derive(Clone)]
pub struct VinoshipperConfig {
    pub username: String,
    pub password: String,
    /// Base URL for the API
    pub base_url: String,
    /// Producer account for feed requests
    pub producer_id: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl VinoshipperConfig {
    /// Create a new config with the given Basic-auth credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            producer_id: DEFAULT_PRODUCER_ID.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_producer_id(mut self, id: impl Into<String>) -> Self {
        self.producer_id = id.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for VinoshipperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VinoshipperConfig")
            .field("username", &self.username)
            .field("base_url", &self.base_url)
            .field("producer_id", &self.producer_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Client for the Vinoshipper producer API.
///
/// Missing credentials are reported per call as
/// [`VinoshipperError::NotConfigured`] so the rest of the service can run
/// without them.
#[derive(Clone)]
pub struct VinoshipperClient {
    http: reqwest::Client,
    base_url: String,
    producer_id: String,
    username: String,
    password: String,
}

impl VinoshipperClient {
    /// Create a new Vinoshipper client.
    pub fn new(config: VinoshipperConfig) -> Result<Self, VinoshipperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            producer_id: config.producer_id,
            username: config.username,
            password: config.password,
        })
    }

    /// Whether credentials were supplied.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Search for UPS access points near an address.
    pub async fn access_points(
        &self,
        request: &AccessPointRequest,
    ) -> Result<Vec<Value>, VinoshipperError> {
        let url = format!("{}/p/addresses/access-points", self.base_url);
        debug!(url = %url, city = %request.city, state = %request.state_code,
            "Making Vinoshipper access points API request");

        let builder = self.authorized(self.http.post(&url))?.json(request);
        let response: AccessPointResponse = self.send(builder).await?;

        info!(
            access_point_count = response.locations.len(),
            "Successfully retrieved Vinoshipper access points"
        );
        Ok(response.locations)
    }

    /// Run a compliance check for an order-shaped body.
    ///
    /// The body is forwarded as received. Any HTTP status with a JSON body is
    /// a result; see [`ComplianceCheck`].
    pub async fn check_compliance(&self, body: &Value) -> Result<ComplianceCheck, VinoshipperError> {
        let url = format!("{}/p/orders/check-compliance", self.base_url);
        let response = self.authorized(self.http.post(&url))?.json(body).send().await?;

        let status = response.status();
        info!(status = status.as_u16(), "Vinoshipper compliance response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(VinoshipperError::Unauthorized);
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text).map_err(|e| VinoshipperError::Json {
            message: e.to_string(),
            body: Some(text.chars().take(500).collect()),
        })?;

        Ok(ComplianceCheck {
            status: status.as_u16(),
            body,
        })
    }

    /// Create an order. Returns Vinoshipper's order record.
    pub async fn create_order(&self, order: &VinoshipperOrder) -> Result<Value, VinoshipperError> {
        let url = format!("{}/p/orders", self.base_url);
        info!(order_number = %order.order_number, product_count = order.products.len(),
            "Creating Vinoshipper order");

        let builder = self.authorized(self.http.post(&url))?.json(order);
        let created: Value = self.send(builder).await.inspect_err(|e| {
            error!(order_number = %order.order_number, error = %e, "Error creating Vinoshipper order")
        })?;

        info!(order_number = %order.order_number, vinoshipper_order_id = %created["id"],
            "Successfully created Vinoshipper order");
        Ok(created)
    }

    /// Replace an existing order.
    pub async fn update_order(
        &self,
        order_id: &str,
        order: &VinoshipperOrder,
    ) -> Result<Value, VinoshipperError> {
        let url = format!("{}/p/orders/{}", self.base_url, order_id);
        info!(order_id, order_number = %order.order_number, "Updating Vinoshipper order");

        let builder = self.authorized(self.http.put(&url))?.json(order);
        self.send(builder).await.inspect_err(|e| {
            error!(order_id, error = %e, "Error updating Vinoshipper order")
        })
    }

    /// Cancel an order.
    pub async fn cancel_order(&self, order_id: &str) -> Result<Value, VinoshipperError> {
        let url = format!("{}/p/orders/{}/cancel", self.base_url, order_id);
        info!(order_id, "Cancelling Vinoshipper order");

        let builder = self
            .authorized(self.http.post(&url))?
            .json(&serde_json::json!({}));
        self.send(builder).await.inspect_err(|e| {
            error!(order_id, error = %e, "Error cancelling Vinoshipper order")
        })
    }

    /// Fetch every product in the producer feed.
    pub async fn products(&self) -> Result<Vec<FeedProduct>, VinoshipperError> {
        let url = format!("{}/feeds/vs/{}/products", self.base_url, self.producer_id);
        let feed: ProductFeed = self.send(self.authorized(self.http.get(&url))?).await?;
        Ok(feed.products)
    }

    /// Fetch a single product from the producer feed.
    pub async fn product(&self, product_id: &str) -> Result<FeedProduct, VinoshipperError> {
        let url = format!(
            "{}/feeds/vs/{}/products/{}",
            self.base_url, self.producer_id, product_id
        );
        let product: FeedProduct = self.send(self.authorized(self.http.get(&url))?).await?;
        debug!(product_id = %product.id, "Fetched Vinoshipper product");
        Ok(product)
    }

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, VinoshipperError> {
        if !self.is_configured() {
            return Err(VinoshipperError::NotConfigured(
                "VINOSHIPPER_USERNAME and VINOSHIPPER_PASSWORD are required".to_string(),
            ));
        }
        Ok(builder.basic_auth(&self.username, Some(&self.password)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, VinoshipperError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(VinoshipperError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Vinoshipper API request failed");
            return Err(VinoshipperError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
                body: serde_json::from_str(&body).ok(),
            });
        }

        serde_json::from_str(&body).map_err(|e| VinoshipperError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;
    use crate::vinoshipper::types::{
        CustomerAddress, OrderCustomer, OrderProduct, Phone, ShipToAddress, ShippingRate,
    };
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> VinoshipperClient {
        let config = VinoshipperConfig::new("user", "pass")
            .with_base_url(server.url())
            .with_producer_id("99");
        VinoshipperClient::new(config).unwrap()
    }

    fn request() -> AccessPointRequest {
        AccessPointRequest::new(&Address::new("1 Main", "Atlanta", "GA", "30005"), "4045550100")
    }

    #[test]
    fn config_defaults() {
        let config = VinoshipperConfig::new("u", "p");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.producer_id, "2212");
        assert!(!format!("{config:?}").contains("\"p\""));
    }

    #[tokio::test]
    async fn access_points_use_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/p/addresses/access-points")
            .match_header(
                "authorization",
                format!("Basic {}", STANDARD.encode("user:pass")).as_str(),
            )
            .match_body(Matcher::PartialJson(json!({"street1": "1 Main", "stateCode": "GA"})))
            .with_status(200)
            .with_body(r#"{"locations":[{"id":"AP1"},{"id":"AP2"}]}"#)
            .create_async()
            .await;

        let locations = client_for(&server).access_points(&request()).await.unwrap();
        assert_eq!(locations, vec![json!({"id": "AP1"}), json!({"id": "AP2"})]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn access_points_missing_list_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/p/addresses/access-points")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let locations = client_for(&server).access_points(&request()).await.unwrap();
        assert!(locations.is_empty());
    }

    #[tokio::test]
    async fn status_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/p/addresses/access-points")
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server)
            .access_points(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, VinoshipperError::Unauthorized));

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/p/addresses/access-points")
            .with_status(400)
            .with_body(r#"{"error":{"errors":["postalCode invalid"]}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .access_points(&request())
            .await
            .unwrap_err();
        match err {
            VinoshipperError::Api { status, body, .. } => {
                assert_eq!(status, 400);
                assert!(body.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfigured_client_makes_no_call() {
        let client = VinoshipperClient::new(VinoshipperConfig::new("", "")).unwrap();
        let err = client.access_points(&request()).await.unwrap_err();
        assert!(matches!(err, VinoshipperError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn compliance_keeps_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/p/orders/check-compliance")
            .with_status(422)
            .with_body(r#"{"isCompliant":false,"reasons":["state"]}"#)
            .create_async()
            .await;

        let check = client_for(&server)
            .check_compliance(&json!({"customer": {}}))
            .await
            .unwrap();
        assert_eq!(check.status, 422);
        assert!(!check.is_compliant());
    }

    #[tokio::test]
    async fn product_feed_paths() {
        let mut server = mockito::Server::new_async().await;
        let one = server
            .mock("GET", "/feeds/vs/99/products/158960")
            .with_status(200)
            .with_body(r#"{"id":158960,"name":"Rosé","price":24.0}"#)
            .create_async()
            .await;
        let all = server
            .mock("GET", "/feeds/vs/99/products")
            .with_status(200)
            .with_body(r#"{"products":[{"id":1},{"id":2}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let product = client.product("158960").await.unwrap();
        assert_eq!(product.id, "158960");
        assert_eq!(product.price, Some(24.0));

        let products = client.products().await.unwrap();
        assert_eq!(products.len(), 2);

        one.assert_async().await;
        all.assert_async().await;
    }

    #[tokio::test]
    async fn cancel_order_path() {
        let mut server = mockito::Server::new_async().await;
        let cancel = server
            .mock("POST", "/p/orders/77/cancel")
            .with_status(200)
            .with_body(r#"{"id":77,"status":"cancelled"}"#)
            .create_async()
            .await;

        let result = client_for(&server).cancel_order("77").await.unwrap();
        assert_eq!(result["status"], "cancelled");
        cancel.assert_async().await;
    }

    #[tokio::test]
    async fn update_order_puts_order() {
        let mut server = mockito::Server::new_async().await;
        let update = server
            .mock("PUT", "/p/orders/77")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "orderNumber": "RDW-SHPFY-1001",
                "status": "processing",
                "shippingRate": {"rateCode": "03", "carrier": "UPS"}
            })))
            .with_status(200)
            .with_body(r#"{"id":77}"#)
            .create_async()
            .await;

        let order = VinoshipperOrder {
            paid: None,
            customer: OrderCustomer {
                address: CustomerAddress {
                    street1: Some("1 Main".into()),
                    city: Some("Atlanta".into()),
                    postal_code: Some("30005".into()),
                    state_code: Some("GA".into()),
                },
                email: Some("ana@example.com".into()),
                first_name: None,
                last_name: None,
                phone: None,
            },
            ship_to_address: ShipToAddress {
                country: Some("US".into()),
                phone: Phone {
                    number: None,
                    country: 1,
                },
                postal_code: Some("30005".into()),
                state_code: Some("GA".into()),
                city: Some("Atlanta".into()),
                street1: Some("1 Main".into()),
                street2: None,
                ups_access_point_id: None,
            },
            shipping_rate: ShippingRate {
                rate_code: "03".into(),
                carrier: "UPS".into(),
            },
            products: vec![OrderProduct {
                product_id: 158960,
                quantity: 1,
                price: 20.0,
            }],
            product_id_type: "VS_ID".into(),
            order_number: "RDW-SHPFY-1001".into(),
            order_date: None,
            total_price: 20.0,
            shipping_price: 0.0,
            tax: 0.0,
            status: Some("processing".into()),
        };

        let result = client_for(&server).update_order("77", &order).await.unwrap();
        assert_eq!(result["id"], 77);
        update.assert_async().await;
    }
}
