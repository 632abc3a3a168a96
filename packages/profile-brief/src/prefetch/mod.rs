//! Prefetch coordinator - background population of the summary cache.
//!
//! One run per page-load signal:
//!
//! 1. Derive the page identity and read the cache. A fresh bundle ends the run.
//! 2. Obtain a profile (from the page-load message, or by scraping). A scrape
//!    failure ends the run silently.
//! 3. Invalidate the old bundle, then call the direct and web-augmented
//!    summaries concurrently. Each call settles on its own.
//! 4. Write both outcomes as one bundle, unless both calls failed.
//! 5. Raise the completion signal and clear it after the badge duration.
//!
//! Runs for an identity already in progress are skipped.

pub mod guard;

use chrono::Utc;
use futures::future::join;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::agent::BackgroundMessage;
use crate::error::Result;
use crate::freshness::is_fresh;
use crate::traits::{
    scraper::Scraper, signal::CompletionSignal, store::CacheStore, summarizer::Summarizer,
};
use crate::types::{
    config::BriefingConfig,
    entry::{CacheEntry, SummaryOutcome},
    identity::PageIdentity,
    profile::{Profile, ProfileRecord},
};

pub use guard::PageLoadGuard;

/// What a prefetch run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// A fresh bundle was already cached
    Fresh,

    /// Another run for the same identity is in progress
    AlreadyRunning,

    /// The page had no identifiable profile
    ScrapeFailed { reason: String },

    /// Both summarization calls failed; nothing was written
    AllFailed,

    /// A new bundle was written
    Written(CacheEntry),
}

impl PrefetchOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Background coordinator that fills the cache ahead of the popup.
pub struct PrefetchCoordinator<S, A, P> {
    store: Arc<S>,
    summarizer: Arc<A>,
    scraper: Arc<P>,
    signal: Arc<dyn CompletionSignal>,
    config: BriefingConfig,
    in_flight: Arc<Mutex<HashSet<PageIdentity>>>,
}

impl<S, A, P> Clone for PrefetchCoordinator<S, A, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            summarizer: Arc::clone(&self.summarizer),
            scraper: Arc::clone(&self.scraper),
            signal: Arc::clone(&self.signal),
            config: self.config.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S, A, P> PrefetchCoordinator<S, A, P>
where
    S: CacheStore + 'static,
    A: Summarizer + 'static,
    P: Scraper + 'static,
{
    /// Create a coordinator with the default config and no completion signal.
    pub fn new(store: Arc<S>, summarizer: Arc<A>, scraper: Arc<P>) -> Self {
        Self {
            store,
            summarizer,
            scraper,
            signal: Arc::new(crate::traits::signal::NoopSignal),
            config: BriefingConfig::default(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Set the coordinator config.
    pub fn with_config(mut self, config: BriefingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the completion signal.
    pub fn with_signal(mut self, signal: Arc<dyn CompletionSignal>) -> Self {
        self.signal = signal;
        self
    }

    pub fn config(&self) -> &BriefingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run a prefetch for a page address, scraping the page itself.
    pub async fn run(&self, address: &str) -> Result<PrefetchOutcome> {
        let identity = PageIdentity::from_address(address);
        let Some(_claim) = InFlight::claim(&self.in_flight, &identity) else {
            debug!(identity = %identity, "Prefetch already running");
            return Ok(PrefetchOutcome::AlreadyRunning);
        };

        if self.has_fresh(&identity).await? {
            return Ok(PrefetchOutcome::Fresh);
        }

        let profile = match self.scraper.scrape_profile(address).await {
            ProfileRecord::Success(profile) => profile,
            ProfileRecord::Failure { reason } => {
                debug!(identity = %identity, reason = %reason, "Scrape failed, skipping prefetch");
                return Ok(PrefetchOutcome::ScrapeFailed { reason });
            }
        };

        self.summarize_and_store(&identity, &profile).await
    }

    /// Handle a page-load message carrying an already scraped profile.
    pub async fn handle_message(&self, message: BackgroundMessage) -> Result<PrefetchOutcome> {
        match message {
            BackgroundMessage::PrefetchSummary { page_url, profile } => {
                let identity = PageIdentity::from_address(&page_url);
                let Some(_claim) = InFlight::claim(&self.in_flight, &identity) else {
                    debug!(identity = %identity, "Prefetch already running");
                    return Ok(PrefetchOutcome::AlreadyRunning);
                };

                if self.has_fresh(&identity).await? {
                    return Ok(PrefetchOutcome::Fresh);
                }

                self.summarize_and_store(&identity, &profile).await
            }
        }
    }

    /// Whether a run for this identity is currently in progress.
    pub fn is_running(&self, identity: &PageIdentity) -> bool {
        match self.in_flight.lock() {
            Ok(set) => set.contains(identity),
            Err(poisoned) => poisoned.into_inner().contains(identity),
        }
    }

    async fn has_fresh(&self, identity: &PageIdentity) -> Result<bool> {
        let fresh = match self.store.get(identity).await? {
            Some(entry) => is_fresh(&entry, Utc::now(), self.config.freshness_window),
            None => false,
        };
        if fresh {
            debug!(identity = %identity, "Cached summary is fresh");
        }
        Ok(fresh)
    }

    async fn summarize_and_store(
        &self,
        identity: &PageIdentity,
        profile: &Profile,
    ) -> Result<PrefetchOutcome> {
        self.store.remove(identity).await?;

        info!(identity = %identity, name = %profile.name, "Prefetching summaries");

        let (direct, web) = join(
            self.summarizer.summarize(profile),
            self.summarizer.web_summarize(profile),
        )
        .await;

        if let Err(e) = &direct {
            warn!(identity = %identity, error = %e, "Direct summary failed");
        }
        if let Err(e) = &web {
            warn!(identity = %identity, error = %e, "Web summary failed");
        }

        let entry = CacheEntry::new(
            SummaryOutcome::from_result(direct),
            SummaryOutcome::from_result(web),
        );

        if entry.all_failed() {
            return Ok(PrefetchOutcome::AllFailed);
        }

        self.store.put(identity, &entry).await?;
        info!(identity = %identity, "Summary bundle cached");

        self.raise_signal(identity).await;

        Ok(PrefetchOutcome::Written(entry))
    }

    async fn raise_signal(&self, identity: &PageIdentity) {
        self.signal.show(identity).await;

        let signal = Arc::clone(&self.signal);
        let identity = identity.clone();
        let duration = self.config.badge_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            signal.clear(&identity).await;
        });
    }
}

/// Membership in the in-flight set, released on drop.
struct InFlight {
    set: Arc<Mutex<HashSet<PageIdentity>>>,
    identity: PageIdentity,
}

impl InFlight {
    fn claim(set: &Arc<Mutex<HashSet<PageIdentity>>>, identity: &PageIdentity) -> Option<Self> {
        let inserted = match set.lock() {
            Ok(mut guard) => guard.insert(identity.clone()),
            Err(poisoned) => poisoned.into_inner().insert(identity.clone()),
        };

        inserted.then(|| Self {
            set: Arc::clone(set),
            identity: identity.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        match self.set.lock() {
            Ok(mut guard) => guard.remove(&self.identity),
            Err(poisoned) => poisoned.into_inner().remove(&self.identity),
        };
    }
}
