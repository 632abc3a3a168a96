//! Freshness policy shared by the prefetch coordinator and the popup.
//!
//! Both sides call [`is_fresh`] instead of comparing timestamps themselves,
//! so there is exactly one notion of "fresh".

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::types::entry::CacheEntry;

/// Default freshness window (30 minutes).
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(30 * 60);

/// True iff `now - entry.created_at < window`.
///
/// The boundary is exclusive: an entry exactly `window` old is stale.
pub fn is_fresh(entry: &CacheEntry, now: DateTime<Utc>, window: Duration) -> bool {
    let window = match chrono::Duration::from_std(window) {
        Ok(window) => window,
        // Larger than chrono can represent: nothing is ever that old.
        Err(_) => return true,
    };
    now.signed_duration_since(entry.created_at) < window
}

/// Freshness check of an optional entry.
pub fn fresh_entry(
    entry: Option<CacheEntry>,
    now: DateTime<Utc>,
    window: Duration,
) -> Option<CacheEntry> {
    entry.filter(|entry| is_fresh(entry, now, window))
}
