//! Vinoshipper producer API client.
//!
//! Vinoshipper is the compliance and fulfilment back end: it finds UPS
//! access points, checks whether an order may legally ship, accepts orders
//! and publishes the producer's product feed. All calls use HTTP Basic auth.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_PRODUCER_ID, VinoshipperClient, VinoshipperConfig};
pub use error::VinoshipperError;
pub use types::{
    AccessPointRequest, AccessPointResponse, ComplianceCheck, CustomerAddress, FeedProduct,
    OrderCustomer, OrderProduct, Phone, ProductFeed, ShipToAddress, ShippingRate,
    VinoshipperOrder, Weight,
};
