//! Location search criteria.
//!
//! Callers may send a partial `searchCriteria` object. It is laid over
//! [`SearchCriteria::default`]: scalar fields replace the default when
//! present, nested option groups merge key by key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DomainError;

/// Sort and visibility options for a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchOptions {
    pub return_all_locations: bool,
    pub show_non_pickup_locations: bool,
    pub show_closed_locations: bool,
    pub sort_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPointSearch {
    pub public_access_point: bool,
    pub retail_location: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DropoffFacilities {
    pub dropoff_facility: bool,
    pub hold_for_pickup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    #[serde(rename = "SundayHours")]
    pub sunday_hours: bool,
    #[serde(rename = "After5PMHours")]
    pub after_5pm_hours: bool,
    #[serde(rename = "After6PMHours")]
    pub after_6pm_hours: bool,
}

/// Location filter groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filters {
    pub access_point_search: AccessPointSearch,
    pub dropoff_facilities: DropoffFacilities,
    pub operating_hours: OperatingHours,
}

/// A complete search configuration.
///
/// Field order is part of the cache key (see [`SearchCriteria::canonical`]);
/// reordering fields invalidates every partitioned cache row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Maximum number of locations to return
    pub max_results: u32,

    /// Search radius in miles
    pub radius: u32,

    /// Service codes; only the first is sent upstream
    pub service_types: Vec<String>,

    pub search_options: SearchOptions,

    pub filters: Filters,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            max_results: 10,
            radius: 25,
            service_types: vec!["01".to_string()], // daily pickup
            search_options: SearchOptions {
                return_all_locations: false,
                show_non_pickup_locations: false,
                show_closed_locations: false,
                sort_by: "Distance".to_string(),
            },
            filters: Filters {
                access_point_search: AccessPointSearch {
                    public_access_point: true,
                    retail_location: true,
                },
                dropoff_facilities: DropoffFacilities {
                    dropoff_facility: true,
                    hold_for_pickup: true,
                },
                operating_hours: OperatingHours {
                    sunday_hours: false,
                    after_5pm_hours: true,
                    after_6pm_hours: false,
                },
            },
        }
    }
}

impl SearchCriteria {
    /// Merge caller overrides over the defaults.
    ///
    /// `None` and JSON `null` yield the defaults. Overrides must be an object;
    /// `null` members are ignored, unknown members are dropped.
    pub fn merged(overrides: Option<&Value>) -> Result<Self, DomainError> {
        let defaults = Self::default();

        let patch = match overrides {
            None | Some(Value::Null) => return Ok(defaults),
            Some(patch @ Value::Object(_)) => patch.clone(),
            Some(_) => {
                return Err(DomainError::InvalidCriteria(
                    "searchCriteria must be an object".to_string(),
                ));
            }
        };

        let mut merged = serde_json::to_value(&defaults)
            .map_err(|e| DomainError::InvalidCriteria(e.to_string()))?;
        overlay(&mut merged, patch);

        serde_json::from_value(merged).map_err(|e| DomainError::InvalidCriteria(e.to_string()))
    }

    /// Whether this configuration differs from the defaults.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Stable JSON rendering used to partition cache keys.
    pub fn canonical(&self) -> String {
        // Plain structs of strings, integers and bools always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// The service code sent upstream.
    pub fn primary_service_code(&self) -> &str {
        self.service_types
            .first()
            .map(String::as_str)
            .unwrap_or("01")
    }
}

/// Deep-merge `patch` into `target`: objects merge per key, anything else
/// replaces. Nulls in the patch are skipped.
fn overlay(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}
