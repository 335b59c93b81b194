//! Canonical pickup / access-point location.
//!
//! Upstream responses are mapped onto this shape before they are cached or
//! returned, so cached rows and fresh results look identical to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Postal address of a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "state")]
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A candidate drop-off or access-point location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Upstream location identifier
    #[serde(rename = "locationId")]
    pub id: String,

    pub name: String,

    /// Upstream location type (e.g. access point, retail)
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub address: LocationAddress,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    /// Distance from the search origin, in the search's unit of measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    /// Opening hours as sent by the upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
}

impl Location {
    /// Create a location with only identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: None,
            address: LocationAddress::default(),
            coordinates: None,
            distance: None,
            operating_hours: None,
            services: None,
            capabilities: None,
        }
    }
}
