//! Shopify Admin API client.
//!
//! Used for three side effects: tagging compliant customers, creating
//! products during a catalogue sync, and fulfilling orders once Vinoshipper
//! reports them shipped. Authenticates with `X-Shopify-Access-Token`.

mod client;
mod error;
mod types;

pub use client::{ShopifyClient, ShopifyConfig};
pub use error::ShopifyError;
pub use types::{
    CreatedFulfillment, CustomerUpdate, Fulfillment, FulfillmentLineItem, LineItem,
    MailingAddress, NewProduct, NewVariant, NoteAttribute, ProductImage, ProductOption,
    ShippingAddress, ShopifyOrder, ShopifyProductRef, ShopifyVariantRef,
};
