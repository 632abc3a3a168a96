//! Cancellable timed poll for a background prefetch to land.

use chrono::Utc;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::freshness::fresh_entry;
use crate::traits::store::CacheStore;
use crate::types::{entry::CacheEntry, identity::PageIdentity};

/// How a poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A fresh bundle appeared
    Found(CacheEntry),
    /// The total wait elapsed
    TimedOut,
    /// The session closed first
    Cancelled,
}

/// Poll timing.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
    pub freshness_window: Duration,
}

/// Read the store every `interval` until a fresh bundle appears.
///
/// The first read happens one interval after the call. The deadline wins
/// over a tick due at the same instant, and no read is issued once the
/// deadline or the cancellation has fired.
pub async fn poll_for_fresh<S>(
    store: &S,
    identity: &PageIdentity,
    schedule: PollSchedule,
    cancel: &CancellationToken,
) -> PollOutcome
where
    S: CacheStore + ?Sized,
{
    let start = Instant::now();
    let deadline = sleep_until(start + schedule.timeout);
    tokio::pin!(deadline);

    let mut ticker = interval_at(start + schedule.interval, schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(identity = %identity, "Poll cancelled");
                return PollOutcome::Cancelled;
            }
            _ = &mut deadline => {
                debug!(identity = %identity, "Poll timed out");
                return PollOutcome::TimedOut;
            }
            _ = ticker.tick() => {
                match store.get(identity).await {
                    Ok(entry) => {
                        if let Some(entry) = fresh_entry(entry, Utc::now(), schedule.freshness_window) {
                            return PollOutcome::Found(entry);
                        }
                    }
                    Err(e) => warn!(identity = %identity, error = %e, "Poll read failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::CountingStore;
    use crate::types::entry::SummaryOutcome;

    fn schedule() -> PollSchedule {
        PollSchedule {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            freshness_window: Duration::from_secs(30 * 60),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_fourteen_reads() {
        let store = CountingStore::new(MemoryStore::new());
        let id = PageIdentity::from_address("https://x/in/jdoe");

        let outcome = poll_for_fresh(&store, &id, schedule(), &CancellationToken::new()).await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(store.reads(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finds_existing_entry_on_first_tick() {
        let store = MemoryStore::new();
        let id = PageIdentity::from_address("https://x/in/jdoe");
        let entry = CacheEntry::new(SummaryOutcome::summary("A"), SummaryOutcome::summary("B"));
        store.put(&id, &entry).await.unwrap();

        let outcome = poll_for_fresh(&store, &id, schedule(), &CancellationToken::new()).await;
        assert_eq!(outcome, PollOutcome::Found(entry));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_stops_immediately() {
        let store = CountingStore::new(MemoryStore::new());
        let id = PageIdentity::from_address("https://x/in/jdoe");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = poll_for_fresh(&store, &id, schedule(), &cancel).await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert_eq!(store.reads(), 0);
    }
}
