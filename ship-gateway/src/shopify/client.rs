//! Shopify Admin API client.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::error::ShopifyError;
use super::types::{
    CreatedFulfillment, CustomerUpdate, Fulfillment, FulfillmentEnvelope, NewProduct, OrderList,
    ProductEnvelope, ShopifyOrder, ShopifyProductRef,
};

const GRAPHQL_VERSION: &str = "2023-10";
const PRODUCTS_VERSION: &str = "2024-01";
const ORDERS_VERSION: &str = "2025-04";

const CUSTOMER_UPDATE: &str = r#"
mutation customerUpdate($input: CustomerInput!) {
  customerUpdate(input: $input) {
    customer {
      id
      firstName
      lastName
      phone
      tags
      defaultAddress {
        firstName lastName address1 address2 city province country zip phone countryCode
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

/// Configuration for the Shopify client.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shop domain, e.g. `example.myshopify.com`
    pub domain: String,
    pub access_token: String,
    /// Overrides `https://{domain}` (for testing)
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ShopifyConfig {
    pub fn new(domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            access_token: access_token.into(),
            base_url: None,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Client for the Shopify Admin REST and GraphQL APIs.
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    /// `None` when no shop domain was configured
    base_url: Option<String>,
}

impl ShopifyClient {
    /// Create a new Shopify client.
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let token = HeaderValue::from_str(&config.access_token).map_err(|_| ShopifyError::Api {
            status: 0,
            message: "Invalid access token format".to_string(),
        })?;
        headers.insert(HeaderName::from_static("x-shopify-access-token"), token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = match config.base_url {
            Some(url) => Some(url),
            None if config.domain.is_empty() => None,
            None => Some(format!("https://{}", config.domain)),
        };

        Ok(Self {
            http,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    /// Tag a customer and update their name, phone and address.
    pub async fn tag_customer(&self, update: &CustomerUpdate) -> Result<Value, ShopifyError> {
        let url = format!("{}/admin/api/{GRAPHQL_VERSION}/graphql.json", self.base_url()?);

        let variables = json!({
            "input": {
                "id": format!("gid://shopify/Customer/{}", update.customer_id),
                "tags": [update.tag],
                "phone": update.phone,
                "firstName": update.first_name,
                "lastName": update.last_name,
                "addresses": update.address.as_ref().map(|a| vec![a]),
            }
        });

        let result: Value = self
            .send(
                self.http
                    .post(&url)
                    .json(&json!({"query": CUSTOMER_UPDATE, "variables": variables})),
            )
            .await?;

        let user_errors = result
            .pointer("/data/customerUpdate/userErrors")
            .and_then(Value::as_array)
            .is_some_and(|errors| !errors.is_empty());

        if result.get("errors").is_some() || user_errors {
            return Err(ShopifyError::GraphQl(result.to_string()));
        }

        info!(customer_id = %update.customer_id, tag = %update.tag, "Tagged Shopify customer");
        Ok(result
            .pointer("/data/customerUpdate/customer")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Create a product.
    pub async fn create_product(
        &self,
        product: &NewProduct,
    ) -> Result<ShopifyProductRef, ShopifyError> {
        let url = format!("{}/admin/api/{PRODUCTS_VERSION}/products.json", self.base_url()?);
        debug!(title = %product.title, "Creating Shopify product");

        let created: ProductEnvelope = self
            .send(self.http.post(&url).json(&json!({"product": product})))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create product in Shopify"))?;

        Ok(created.product)
    }

    /// Find an order by its display name (the order number).
    pub async fn find_order_by_name(&self, name: &str) -> Result<ShopifyOrder, ShopifyError> {
        let url = format!("{}/admin/api/{ORDERS_VERSION}/orders.json", self.base_url()?);

        let list: OrderList = self
            .send(self.http.get(&url).query(&[("name", name)]))
            .await?;

        let order = list.orders.into_iter().next().ok_or_else(|| {
            warn!(order_name = name, "Shopify order not found");
            ShopifyError::OrderNotFound(name.to_string())
        })?;

        info!(
            shopify_order_id = order.id,
            fulfillment_status = ?order.fulfillment_status,
            "Found Shopify order"
        );
        Ok(order)
    }

    /// Create a fulfillment for an order.
    pub async fn create_fulfillment(
        &self,
        order_id: u64,
        fulfillment: &Fulfillment,
    ) -> Result<CreatedFulfillment, ShopifyError> {
        let url = format!(
            "{}/admin/api/{ORDERS_VERSION}/orders/{}/fulfillments.json",
            self.base_url()?,
            order_id
        );

        let created: FulfillmentEnvelope = self
            .send(self.http.post(&url).json(&json!({"fulfillment": fulfillment})))
            .await?;

        info!(
            shopify_order_id = order_id,
            fulfillment_id = created.fulfillment.id,
            tracking_number = ?created.fulfillment.tracking_number,
            "Successfully created Shopify fulfillment"
        );
        Ok(created.fulfillment)
    }

    fn base_url(&self) -> Result<&str, ShopifyError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| ShopifyError::NotConfigured("SHOPIFY_DOMAIN is required".to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ShopifyError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ShopifyError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ShopifyError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}
