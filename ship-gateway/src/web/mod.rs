//! Web layer for the shipping gateway.
//!
//! Provides the HTTP endpoints for location lookups, compliance checks,
//! order webhooks and product sync.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, StartupError};
