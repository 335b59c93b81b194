//! Vinoshipper API error types.

use serde_json::Value;

/// Errors that can occur when interacting with the Vinoshipper API.
#[derive(Debug, thiserror::Error)]
pub enum VinoshipperError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("Vinoshipper authentication failed")]
    Unauthorized,

    /// API returned an error status
    #[error("Vinoshipper API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Raw error payload, when it was JSON
        body: Option<Value>,
    },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Credentials not supplied
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl VinoshipperError {
    /// Upstream HTTP status, when the API answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            VinoshipperError::Unauthorized => Some(401),
            VinoshipperError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_of_errors() {
        assert_eq!(VinoshipperError::Unauthorized.status(), Some(401));
        let err = VinoshipperError::Api {
            status: 422,
            message: "bad".into(),
            body: None,
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "Vinoshipper API error 422: bad");
        assert_eq!(
            VinoshipperError::NotConfigured("x".into()).status(),
            None
        );
    }
}
