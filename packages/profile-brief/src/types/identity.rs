//! Page identity - the cache partition key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key namespace for summary bundles.
pub const SUMMARY_KEY_PREFIX: &str = "summary:";

/// Normalized identity of a logical profile page.
///
/// Derived from the page address with the query component stripped, so
/// transient URL parameters never split the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIdentity(String);

impl PageIdentity {
    /// Derive the identity for a raw page address.
    pub fn from_address(address: &str) -> Self {
        let base = match address.split_once('?') {
            Some((base, _query)) => base,
            None => address,
        };
        Self(base.to_string())
    }

    /// Key under which this page's summary bundle is stored.
    pub fn storage_key(&self) -> String {
        format!("{SUMMARY_KEY_PREFIX}{}", self.0)
    }

    /// Recover an identity from a storage key.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        key.strip_prefix(SUMMARY_KEY_PREFIX)
            .map(|rest| Self(rest.to_string()))
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_stripped() {
        let a = PageIdentity::from_address("https://x/in/jdoe?x=1");
        let b = PageIdentity::from_address("https://x/in/jdoe?y=2");

        assert_eq!(a, b);
        assert_eq!(a.storage_key(), "summary:https://x/in/jdoe");
    }

    #[test]
    fn test_address_without_query_is_kept() {
        let id = PageIdentity::from_address("https://x/in/jdoe/");
        assert_eq!(id.as_str(), "https://x/in/jdoe/");
    }

    #[test]
    fn test_storage_key_round_trip() {
        let id = PageIdentity::from_address("https://x/in/jdoe");
        assert_eq!(PageIdentity::from_storage_key(&id.storage_key()), Some(id));
        assert_eq!(PageIdentity::from_storage_key("other:https://x"), None);
    }
}
