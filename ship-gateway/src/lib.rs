//! Shipping gateway server.
//!
//! Finds UPS drop-off locations and Vinoshipper access points near an
//! address, caching both the upstream bearer token and the answers, and
//! bridges orders between Shopify and Vinoshipper.

pub mod cache;
pub mod compliance;
pub mod config;
pub mod domain;
pub mod lookup;
pub mod shopify;
pub mod store;
pub mod sync;
pub mod ups;
pub mod vinoshipper;
pub mod web;
pub mod webhook;
