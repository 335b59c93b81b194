//! Postal addresses and required-field extraction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DomainError;

/// Country used when a request omits one.
pub const DEFAULT_COUNTRY: &str = "US";

/// Wire names of the four required address fields in a request body.
#[derive(Debug, Clone, Copy)]
pub struct AddressFields {
    pub street: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub postal_code: &'static str,
}

/// Field names used by the UPS location lookup request.
pub const LOCATION_FIELDS: AddressFields = AddressFields {
    street: "street",
    city: "city",
    state: "state",
    postal_code: "postalCode",
};

/// Field names used by Vinoshipper (access points, compliance, orders).
pub const VINOSHIPPER_FIELDS: AddressFields = AddressFields {
    street: "street1",
    city: "city",
    state: "stateCode",
    postal_code: "postalCode",
};

impl AddressFields {
    fn required(&self) -> [&'static str; 4] {
        [self.street, self.city, self.state, self.postal_code]
    }
}

/// A postal address used as a lookup origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Create an address in the default country.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Set the country code.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Extract an address from a JSON request body.
    ///
    /// Every missing field is reported, in declaration order, so the caller
    /// can echo the full list back. `country` is optional.
    pub fn from_body(body: &Value, fields: AddressFields) -> Result<Self, DomainError> {
        if !body.is_object() {
            return Err(DomainError::NotAnObject);
        }

        let missing = missing_fields(body, &fields.required());
        if !missing.is_empty() {
            return Err(DomainError::MissingFields(missing));
        }

        // Presence was checked above.
        let take = |name: &str| field_text(body, name).unwrap_or_default();

        let country = field_text(body, "country").unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

        Ok(Self {
            street: take(fields.street),
            city: take(fields.city),
            state: take(fields.state),
            postal_code: take(fields.postal_code),
            country,
        })
    }
}

/// Read a field as text.
///
/// Strings are trimmed and must be non-empty; numbers are rendered in their
/// JSON form (postal codes are often sent as numbers). Anything else counts
/// as absent.
pub fn field_text(body: &Value, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// List the required fields that are absent or blank.
pub fn missing_fields(body: &Value, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|name| field_text(body, name).is_none())
        .collect()
}
