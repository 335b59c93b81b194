//! UPS OAuth and Locator API DTOs.
//!
//! The Locator API uses PascalCase names throughout and sends most numbers
//! as strings. Response types use `Option` and [`Value`] liberally: UPS omits
//! fields freely and several of them change shape between a single string,
//! a list of strings and a `{Code, Description}` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response from the OAuth client-credentials endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    pub token_type: Option<String>,

    /// Token lifetime in seconds. UPS sends this as a string.
    pub expires_in: Option<StringOrNumber>,

    pub refresh_token: Option<String>,
}

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    Number(u64),
    Text(String),
}

impl StringOrNumber {
    /// The value as an integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            StringOrNumber::Number(n) => Some(*n),
            StringOrNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Error body shared by the OAuth and Locator endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub response: Option<ErrorList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorList {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Extract the first error message from an error response body.
pub fn error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .response?
        .errors
        .into_iter()
        .find_map(|e| e.message)
}

// ---------------------------------------------------------------------------
// Locator request
// ---------------------------------------------------------------------------

/// Top-level Locator request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocatorEnvelope {
    pub locator_request: LocatorRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocatorRequest {
    pub request: RequestHeader,
    pub origin_address: OriginAddress,
    pub translate: Translate,
    pub unit_of_measurement: Code,
    pub location_search_criteria: LocationSearchCriteria,
    pub sort_criteria: SortCriteria,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestHeader {
    pub transaction_reference: TransactionReference,
    pub request_action: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionReference {
    pub customer_context: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginAddress {
    pub address_key_format: RequestAddress,
    pub maximum_list_size: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestAddress {
    pub address_line: String,
    pub political_division2: String,
    pub political_division1: String,
    pub postcode_primary_low: String,
    pub postcode_extended_low: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Translate {
    pub language_code: String,
    pub locale: String,
}

/// A bare `{Code}` object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Code {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationSearchCriteria {
    pub maximum_list_size: String,
    pub search_radius: String,
    pub service_search: ServiceSearch,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSearch {
    /// Earliest pickup time, HHMM
    pub time: String,
    pub service_code: Code,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SortCriteria {
    pub sort_type: String,
}

// ---------------------------------------------------------------------------
// Locator response
// ---------------------------------------------------------------------------

/// Top-level Locator response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocatorResponseEnvelope {
    pub locator_response: Option<LocatorResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocatorResponse {
    pub search_results: Option<SearchResults>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResults {
    /// A single match is sent as an object rather than a one-element list.
    pub drop_location: Option<OneOrMany<DropLocation>>,
}

/// A field UPS sends as either a list or a bare item.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// A single drop-off or access-point location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DropLocation {
    #[serde(rename = "LocationID")]
    pub location_id: Option<Value>,

    pub location_name: Option<Value>,

    /// Location type; a code string or a `{Code, Description}` object
    #[serde(rename = "Type")]
    pub kind: Option<Value>,

    pub address_key_format: Option<ResponseAddress>,

    pub geocode: Option<Geocode>,

    /// A number, a numeric string or `{Value, UnitOfMeasurement}`
    pub distance: Option<Value>,

    pub standard_hours_of_operation: Option<Value>,

    pub services: Option<Value>,

    pub capabilities: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseAddress {
    pub consignee_name: Option<Value>,
    /// One line as a string, or several as a list
    pub address_line: Option<Value>,
    pub political_division2: Option<Value>,
    pub political_division1: Option<Value>,
    pub postcode_primary_low: Option<Value>,
    pub country_code: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geocode {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_in_accepts_string_or_number() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":"14399"}"#).unwrap();
        assert_eq!(token.expires_in.and_then(|e| e.as_u64()), Some(14399));

        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","expires_in":3600}"#).unwrap();
        assert_eq!(token.expires_in.and_then(|e| e.as_u64()), Some(3600));
    }

    #[test]
    fn error_message_from_envelope() {
        let body = r#"{"response":{"errors":[{"code":"250002","message":"Invalid Authentication Information."}]}}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid Authentication Information.")
        );
        assert_eq!(error_message("not json"), None);
        assert_eq!(error_message(r#"{"response":{"errors":[]}}"#), None);
    }

    #[test]
    fn single_drop_location_is_accepted() {
        let body = r#"{"LocatorResponse":{"SearchResults":{"DropLocation":{"LocationID":"1"}}}}"#;
        let parsed: LocatorResponseEnvelope = serde_json::from_str(body).unwrap();
        let locations = parsed
            .locator_response
            .and_then(|r| r.search_results)
            .and_then(|s| s.drop_location)
            .map(OneOrMany::into_vec)
            .unwrap();
        assert_eq!(locations.len(), 1);
    }
}
