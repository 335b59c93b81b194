//! Typed caches over a [`KeyValueStore`](crate::store::KeyValueStore).
//!
//! Expiry is lazy: token and result rows carry their own `expiresAt` (epoch
//! millis) and a row at or past that instant reads as absent. Nothing is
//! ever deleted.
//!
//! Read failures degrade to a miss so that a store outage only costs an
//! upstream call. Write failures propagate and the caller decides.

use std::time::Duration;

mod compliance;
mod credential;
mod results;
mod sync_status;

pub use compliance::{ComplianceCache, ComplianceRecord};
pub use credential::{CachedCredential, CredentialCache, TOKEN_KEY};
pub use results::{CachedResultEntry, ResultCache};
pub use sync_status::{SyncState, SyncStatus, SyncStatusStore};

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Expiry instant `ttl` after `now`, clamped to `i64::MAX`.
pub(crate) fn expiry_after(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_adds_ttl() {
        assert_eq!(expiry_after(1_000, Duration::from_secs(2)), 3_000);
        assert_eq!(expiry_after(1_000, Duration::ZERO), 1_000);
    }

    #[test]
    fn huge_ttl_clamps_instead_of_wrapping() {
        let now = now_millis();
        assert_eq!(expiry_after(now, Duration::from_secs(u64::MAX)), i64::MAX);
        assert_eq!(
            expiry_after(now, Duration::from_secs(18_446_744_073_709_551)),
            i64::MAX
        );
    }
}
