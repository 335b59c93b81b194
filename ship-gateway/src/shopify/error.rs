//! Shopify Admin API error types.

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, thiserror::Error)]
pub enum ShopifyError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Access token rejected
    #[error("unauthorized: check SHOPIFY_ACCESS_TOKEN")]
    Unauthorized,

    /// API returned an error status
    #[error("Shopify API error {status}: {message}")]
    Api { status: u16, message: String },

    /// GraphQL call answered with `errors` or `userErrors`
    #[error("Shopify GraphQL error: {0}")]
    GraphQl(String),

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Requested order does not exist
    #[error("Shopify order not found: {0}")]
    OrderNotFound(String),

    /// Shop domain or token not supplied
    #[error("not configured: {0}")]
    NotConfigured(String),
}
