//! Cache key construction.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::address::Address;
use super::criteria::SearchCriteria;

/// Separator between address components before encoding.
const SEPARATOR: char = '_';

/// A stable key for cached lookup results.
///
/// Derived from the address by trimming and lower-casing each component,
/// backslash-escaping any `\` or `_` in it, joining the components with `_`
/// and base64-encoding the result. Searches with non-default criteria append
/// the criteria's canonical JSON so that each configuration gets its own
/// cache rows.
///
/// # Examples
///
/// ```
/// use ship_gateway::domain::{Address, CacheKey, SearchCriteria};
///
/// let a = Address::new("123 Fork Rd", "Atlanta", "GA", "30005");
/// let b = Address::new("123 FORK RD ", "atlanta", "ga", "30005");
/// assert_eq!(CacheKey::address_hash(&a), CacheKey::address_hash(&b));
///
/// let key = CacheKey::for_search(&a, &SearchCriteria::default());
/// assert_eq!(key, CacheKey::address_hash(&a));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash of the address alone.
    pub fn address_hash(address: &Address) -> Self {
        let normalized = [
            &address.street,
            &address.city,
            &address.state,
            &address.postal_code,
            &address.country,
        ]
        .iter()
        .map(|part| escape(&part.trim().to_lowercase()))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string());

        CacheKey(STANDARD.encode(normalized))
    }

    /// Key for a location search, partitioned by non-default criteria.
    pub fn for_search(address: &Address, criteria: &SearchCriteria) -> Self {
        let hash = Self::address_hash(address);
        if criteria.is_default() {
            hash
        } else {
            hash.with_suffix(&criteria.canonical())
        }
    }

    /// Append a partition suffix (e.g. the upstream name).
    pub fn with_suffix(self, suffix: &str) -> Self {
        CacheKey(format!("{}{SEPARATOR}{suffix}", self.0))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Backslash-escape the separator so distinct components never join alike.
fn escape(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        if c == '\\' || c == SEPARATOR {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn part() -> impl Strategy<Value = String> {
        r"[A-Za-z0-9 _\\]{1,12}"
            .prop_filter("non-blank", |s| !s.trim().is_empty())
    }

    fn address() -> impl Strategy<Value = Address> {
        (part(), part(), part(), part(), "[A-Z]{2}").prop_map(|(s, c, st, p, country)| {
            Address::new(s, c, st, p).with_country(country)
        })
    }

    proptest! {
        #[test]
        fn key_is_deterministic(a in address()) {
            prop_assert_eq!(CacheKey::address_hash(&a), CacheKey::address_hash(&a.clone()));
        }

        #[test]
        fn differing_fields_never_collide(a in address(), b in address()) {
            let norm = |x: &Address| [
                x.street.trim().to_lowercase(),
                x.city.trim().to_lowercase(),
                x.state.trim().to_lowercase(),
                x.postal_code.trim().to_lowercase(),
                x.country.trim().to_lowercase(),
            ];
            prop_assume!(norm(&a) != norm(&b));
            prop_assert_ne!(CacheKey::address_hash(&a), CacheKey::address_hash(&b));
        }

        #[test]
        fn case_never_matters(a in address()) {
            let upper = Address {
                street: a.street.to_uppercase(),
                city: a.city.to_uppercase(),
                state: a.state.to_uppercase(),
                postal_code: a.postal_code.to_uppercase(),
                country: a.country.to_lowercase(),
            };
            prop_assert_eq!(CacheKey::address_hash(&a), CacheKey::address_hash(&upper));
        }
    }
}
