//! Domain types for the shipping gateway.
//!
//! Addresses, locations and search criteria as the rest of the crate sees
//! them, independent of any upstream's wire format. Request bodies are
//! validated here so that handlers can trust what they receive.

mod address;
mod credential;
mod criteria;
mod error;
mod key;
mod location;

pub use address::{
    Address, AddressFields, DEFAULT_COUNTRY, LOCATION_FIELDS, VINOSHIPPER_FIELDS, field_text,
    missing_fields,
};
pub use credential::Credential;
pub use criteria::{
    AccessPointSearch, DropoffFacilities, Filters, OperatingHours, SearchCriteria, SearchOptions,
};
pub use error::DomainError;
pub use key::CacheKey;
pub use location::{Coordinates, Location, LocationAddress};
