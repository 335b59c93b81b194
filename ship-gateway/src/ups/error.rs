//! UPS client error types.

use serde_json::Value;

/// Errors from the UPS HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum UpsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The OAuth endpoint rejected the credential exchange
    #[error("UPS auth error {status}: {message}")]
    Auth {
        status: u16,
        message: String,
        /// Raw upstream error payload, when it was JSON
        body: Option<Value>,
    },

    /// The locator API returned an error status
    #[error("UPS API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Client ID or secret not supplied
    #[error("client ID and secret are required")]
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = UpsError::Auth {
            status: 401,
            message: "Invalid Authentication Information.".into(),
            body: None,
        };
        assert_eq!(
            err.to_string(),
            "UPS auth error 401: Invalid Authentication Information."
        );

        let err = UpsError::Api {
            status: 400,
            message: "Invalid postal code".into(),
        };
        assert_eq!(err.to_string(), "UPS API error 400: Invalid postal code");

        assert_eq!(
            UpsError::MissingCredentials.to_string(),
            "client ID and secret are required"
        );
    }
}
