//! UPS Locator client.
//!
//! Two calls share one error contract:
//! - the OAuth client-credentials exchange, which turns an application
//!   id/secret into a short-lived bearer token;
//! - the Locator search, which returns drop-off and access-point locations
//!   near an origin address.
//!
//! The client does not cache tokens itself; see [`crate::lookup`].

mod client;
mod convert;
mod error;
mod types;

pub use client::{UpsClient, UpsConfig, UpsEnvironment};
pub use convert::{convert_drop_location, convert_response, locator_request};
pub use error::UpsError;
pub use types::{DropLocation, LocatorEnvelope, LocatorResponseEnvelope, TokenResponse};
