//! Idempotent-entry guard for page-load signals.

use std::sync::Mutex;

use crate::types::identity::PageIdentity;

/// Lets one page load trigger at most one prefetch.
///
/// The guard remembers the identity it was claimed for. Repeated ready
/// signals for the same page are refused until [`reset`](Self::reset) is
/// called on navigation. A ready signal for a different identity is a new
/// page load and claims the guard again.
#[derive(Debug, Default)]
pub struct PageLoadGuard {
    claimed: Mutex<Option<PageIdentity>>,
}

impl PageLoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard for a page load. Returns false if already claimed.
    pub fn try_claim(&self, identity: &PageIdentity) -> bool {
        let mut claimed = match self.claimed.lock() {
            Ok(claimed) => claimed,
            Err(poisoned) => poisoned.into_inner(),
        };

        if claimed.as_ref() == Some(identity) {
            return false;
        }
        *claimed = Some(identity.clone());
        true
    }

    /// Forget the current page load.
    pub fn reset(&self) {
        match self.claimed.lock() {
            Ok(mut claimed) => *claimed = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    /// Whether a page load is currently claimed.
    pub fn is_claimed(&self) -> bool {
        match self.claimed.lock() {
            Ok(claimed) => claimed.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_signal_refused() {
        let guard = PageLoadGuard::new();
        let id = PageIdentity::from_address("https://x/in/jdoe");

        assert!(guard.try_claim(&id));
        assert!(!guard.try_claim(&id));
        assert!(!guard.try_claim(&PageIdentity::from_address("https://x/in/jdoe?ref=feed")));
    }

    #[test]
    fn test_reset_on_navigation() {
        let guard = PageLoadGuard::new();
        let id = PageIdentity::from_address("https://x/in/jdoe");

        assert!(guard.try_claim(&id));
        guard.reset();
        assert!(!guard.is_claimed());
        assert!(guard.try_claim(&id));
    }

    #[test]
    fn test_new_identity_claims_again() {
        let guard = PageLoadGuard::new();

        assert!(guard.try_claim(&PageIdentity::from_address("https://x/in/a")));
        assert!(guard.try_claim(&PageIdentity::from_address("https://x/in/b")));
    }
}
