//! Response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::lookup::LookupOutcome;

/// Successful location or access-point lookup.
#[derive(Debug, Serialize)]
pub struct LocationsResponse<T> {
    pub success: bool,
    pub locations: Vec<T>,
    pub cached: bool,
}

impl<T> From<LookupOutcome<T>> for LocationsResponse<T> {
    fn from(outcome: LookupOutcome<T>) -> Self {
        Self {
            success: true,
            locations: outcome.locations,
            cached: outcome.cached,
        }
    }
}

/// Error body of the lookup and compliance endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<&'static str>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
            missing_fields: None,
        }
    }
}

/// Body of the webhook and sync endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Value>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
            topic: None,
            result: None,
            report: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
