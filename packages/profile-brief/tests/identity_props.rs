//! Property tests for page identity and the freshness rule.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use proptest::prelude::*;
use std::time::Duration;

use profile_brief::{is_fresh, CacheEntry, PageIdentity, SummaryOutcome};

fn base_address() -> impl Strategy<Value = String> {
    "https://[a-z]{1,12}\\.example/in/[a-z0-9-]{1,20}/?"
}

fn query() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9=&%_.?-]{0,40}"
}

proptest! {
    #[test]
    fn identity_ignores_query(base in base_address(), a in query(), b in query()) {
        let first = PageIdentity::from_address(&format!("{base}?{a}"));
        let second = PageIdentity::from_address(&format!("{base}?{b}"));

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.as_str(), base.as_str());
        prop_assert_eq!(first.storage_key(), format!("summary:{base}"));
    }

    #[test]
    fn identity_is_deterministic(address in "https://x/in/[a-z]{1,10}(\\?[a-z=]{0,10})?") {
        prop_assert_eq!(
            PageIdentity::from_address(&address),
            PageIdentity::from_address(&address)
        );
    }

    #[test]
    fn fresh_iff_younger_than_window(age_ms in 0i64..7_200_000, window_ms in 1u64..3_600_000) {
        let now = Utc.timestamp_millis_opt(10_000_000_000).unwrap();
        let entry = CacheEntry::at(
            now - ChronoDuration::milliseconds(age_ms),
            SummaryOutcome::summary("A"),
            SummaryOutcome::summary("B"),
        );

        let fresh = is_fresh(&entry, now, Duration::from_millis(window_ms));
        prop_assert_eq!(fresh, (age_ms as u64) < window_ms);
    }
}

#[test]
fn example_addresses_share_key() {
    let a = PageIdentity::from_address("https://x/in/jdoe?x=1");
    let b = PageIdentity::from_address("https://x/in/jdoe?y=2");

    assert_eq!(a.storage_key(), "summary:https://x/in/jdoe");
    assert_eq!(a, b);
}

#[test]
fn boundary_is_stale() {
    let now = Utc.timestamp_millis_opt(1_800_000).unwrap();
    let entry = CacheEntry::at(
        Utc.timestamp_millis_opt(0).unwrap(),
        SummaryOutcome::summary("A"),
        SummaryOutcome::summary("B"),
    );

    assert!(!is_fresh(&entry, now, Duration::from_secs(30 * 60)));
    assert!(is_fresh(
        &entry,
        now - ChronoDuration::milliseconds(1),
        Duration::from_secs(30 * 60)
    ));
}
