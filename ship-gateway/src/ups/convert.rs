//! Conversion between domain types and Locator DTOs.

use serde_json::Value;

use crate::domain::{Address, Coordinates, Location, LocationAddress, SearchCriteria};

use super::types::{
    Code, DropLocation, LocationSearchCriteria, LocatorEnvelope, LocatorRequest,
    LocatorResponseEnvelope, OneOrMany, OriginAddress, RequestAddress, RequestHeader,
    ServiceSearch, SortCriteria, TransactionReference, Translate,
};

/// Build the Locator request body for a search around `address`.
pub fn locator_request(address: &Address, criteria: &SearchCriteria) -> LocatorEnvelope {
    let max_results = criteria.max_results.to_string();

    LocatorEnvelope {
        locator_request: LocatorRequest {
            request: RequestHeader {
                transaction_reference: TransactionReference {
                    customer_context: "Location Search".to_string(),
                },
                request_action: "Locator".to_string(),
            },
            origin_address: OriginAddress {
                address_key_format: RequestAddress {
                    address_line: address.street.clone(),
                    political_division2: address.city.clone(),
                    political_division1: address.state.clone(),
                    postcode_primary_low: address.postal_code.clone(),
                    postcode_extended_low: address.postal_code.clone(),
                    country_code: address.country.clone(),
                },
                maximum_list_size: max_results.clone(),
            },
            translate: Translate {
                language_code: "ENG".to_string(),
                locale: "en_US".to_string(),
            },
            unit_of_measurement: Code {
                code: "MI".to_string(),
            },
            location_search_criteria: LocationSearchCriteria {
                maximum_list_size: max_results,
                search_radius: criteria.radius.to_string(),
                service_search: ServiceSearch {
                    time: "1030".to_string(),
                    service_code: Code {
                        code: criteria.primary_service_code().to_string(),
                    },
                },
            },
            sort_criteria: SortCriteria {
                sort_type: "01".to_string(),
            },
        },
    }
}

/// Map a Locator response onto canonical locations, preserving order.
///
/// A response without search results means zero matches.
pub fn convert_response(response: LocatorResponseEnvelope) -> Vec<Location> {
    response
        .locator_response
        .and_then(|r| r.search_results)
        .and_then(|s| s.drop_location)
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(convert_drop_location)
        .collect()
}

/// Map a single drop location.
pub fn convert_drop_location(drop: DropLocation) -> Location {
    let address_format = drop.address_key_format;

    let name = drop
        .location_name
        .as_ref()
        .and_then(text)
        .or_else(|| {
            address_format
                .as_ref()
                .and_then(|a| a.consignee_name.as_ref())
                .and_then(text)
        })
        .unwrap_or_default();

    let address = address_format
        .map(|a| LocationAddress {
            street: a.address_line.as_ref().and_then(text),
            city: a.political_division2.as_ref().and_then(text),
            region: a.political_division1.as_ref().and_then(text),
            postal_code: a.postcode_primary_low.as_ref().and_then(text),
            country: a.country_code.as_ref().and_then(text),
        })
        .unwrap_or_default();

    let coordinates = drop.geocode.and_then(|g| {
        Some(Coordinates {
            latitude: g.latitude.as_ref().and_then(number)?,
            longitude: g.longitude.as_ref().and_then(number)?,
        })
    });

    Location {
        id: drop.location_id.as_ref().and_then(text).unwrap_or_default(),
        name,
        kind: drop.kind.as_ref().and_then(text),
        address,
        coordinates,
        distance: drop.distance.as_ref().and_then(number),
        operating_hours: drop.standard_hours_of_operation,
        services: drop.services,
        capabilities: drop.capabilities,
    }
}

/// Render a loosely-typed UPS field as text.
///
/// Lists are joined with ", " and `{Code, ...}` objects yield their code.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => map.get("Code").and_then(text),
        _ => None,
    }
}

/// Read a loosely-typed UPS field as a number.
///
/// `{Value, UnitOfMeasurement}` objects yield their value.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("Value").and_then(number),
        _ => None,
    }
}
