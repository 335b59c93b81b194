//! Cached external lookups.
//!
//! A lookup checks the result cache, and only on a miss obtains a credential
//! and calls the upstream. Non-empty answers are cached for [`RESULT_TTL`].
//!
//! ```text
//! CHECK_CACHE --hit--> DONE (cached)
//!     |
//!    miss
//!     v
//! ENSURE_CREDENTIAL --> FETCH_UPSTREAM --> POPULATE_CACHE --> DONE
//!     |                      |
//!     v                      v
//! AuthUnavailable     UpstreamRejected / Internal
//! ```
//!
//! Failures are classified into [`LookupError`]; cache read failures count
//! as misses and cache write failures are logged and dropped.

mod access_points;
mod error;
mod ups;

use std::time::Duration;

use serde::Serialize;

pub use access_points::{ACCESS_POINT_SUFFIX, AccessPointApi, AccessPointLookup};
pub use error::LookupError;
pub use ups::{ApiCredentials, LocatorApi, LocationLookup};

/// How long fresh results stay valid.
pub const RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Results of a lookup and whether they came from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupOutcome<T> {
    pub locations: Vec<T>,
    pub cached: bool,
}
