//! Page context and background worker.
//!
//! The page context ([`PageAgent`]) watches page loads, scrapes once per
//! load, and posts a [`BackgroundMessage`]. The background worker receives
//! messages on an mpsc channel and hands each one to the prefetch
//! coordinator on its own task. The two halves never call each other
//! directly.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{BriefingError, Result};
use crate::prefetch::{PageLoadGuard, PrefetchCoordinator};
use crate::traits::{scraper::Scraper, store::CacheStore, summarizer::Summarizer};
use crate::types::{
    config::BriefingConfig,
    identity::PageIdentity,
    profile::{Profile, ProfileRecord},
};

const CHANNEL_CAPACITY: usize = 64;

/// Message from the page context to the background worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundMessage {
    /// A page finished loading and yielded this profile.
    PrefetchSummary { page_url: String, profile: Profile },
}

/// Sending half of the background channel.
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<BackgroundMessage>,
}

impl BackgroundHandle {
    /// Post a message to the background worker.
    pub async fn send(&self, message: BackgroundMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| BriefingError::WorkerStopped)
    }
}

/// Start the long-lived background worker.
///
/// Every message spawns an independent coordinator run, so a slow backend
/// for one page never delays another. The worker exits once every
/// [`BackgroundHandle`] has been dropped.
pub fn spawn_background<S, A, P>(
    coordinator: PrefetchCoordinator<S, A, P>,
) -> (BackgroundHandle, JoinHandle<()>)
where
    S: CacheStore + 'static,
    A: Summarizer + 'static,
    P: Scraper + 'static,
{
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);

    let worker = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                match coordinator.handle_message(message).await {
                    Ok(outcome) => debug!(outcome = ?outcome, "Prefetch finished"),
                    Err(e) => warn!(error = %e, "Prefetch failed"),
                }
            });
        }
        info!("Background worker stopped");
    });

    (BackgroundHandle { tx }, worker)
}

/// Page-context half: turns page-ready signals into prefetch messages.
pub struct PageAgent<S, P> {
    store: Arc<S>,
    scraper: Arc<P>,
    background: BackgroundHandle,
    guard: PageLoadGuard,
    config: BriefingConfig,
}

impl<S, P> PageAgent<S, P>
where
    S: CacheStore,
    P: Scraper,
{
    pub fn new(store: Arc<S>, scraper: Arc<P>, background: BackgroundHandle) -> Self {
        Self {
            store,
            scraper,
            background,
            guard: PageLoadGuard::new(),
            config: BriefingConfig::default(),
        }
    }

    /// Set the agent config.
    pub fn with_config(mut self, config: BriefingConfig) -> Self {
        self.config = config;
        self
    }

    /// Handle a "page is ready" signal.
    ///
    /// Returns true if a prefetch message was posted. Repeated signals for
    /// the same page load are ignored, as are pages without a profile.
    pub async fn on_page_ready(&self, address: &str) -> Result<bool> {
        let identity = PageIdentity::from_address(address);
        if !self.guard.try_claim(&identity) {
            debug!(identity = %identity, "Page already handled");
            return Ok(false);
        }

        if self.config.refresh_on_page_load {
            self.store.remove(&identity).await?;
        }

        tokio::time::sleep(self.config.page_settle_delay).await;

        match self.scraper.scrape_profile(address).await {
            ProfileRecord::Success(profile) => {
                self.background
                    .send(BackgroundMessage::PrefetchSummary {
                        page_url: address.to_string(),
                        profile,
                    })
                    .await?;
                Ok(true)
            }
            ProfileRecord::Failure { reason } => {
                debug!(identity = %identity, reason = %reason, "No profile on page");
                Ok(false)
            }
        }
    }

    /// Handle navigation away from the current page.
    pub fn on_navigate(&self) {
        self.guard.reset();
    }
}
