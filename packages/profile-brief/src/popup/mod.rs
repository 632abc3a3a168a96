//! Popup session controller.
//!
//! A [`PopupSession`] lives for one popup open. It reconciles the displayed
//! summary against the cache, waits for an in-flight background prefetch,
//! falls back to on-demand fetches, and runs the follow-up question cycle.
//!
//! ```text
//! Opening -> CheckingCache -> CacheHit ---------------------> Ready
//!                          -> AwaitingPrefetch -> Ready | TimedOut
//!                          -> OnDemandFetch -----------------> Ready
//! ```
//!
//! The view is published on a `watch` channel after every change. The
//! session never holds a lock across a network call.

pub mod format;
pub mod poll;
pub mod view;

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BriefingError, Result, ServiceError, ServiceResult};
use crate::freshness::fresh_entry;
use crate::traits::{scraper::Scraper, store::CacheStore, summarizer::Summarizer};
use crate::types::{
    chat::{ChatTurn, QuestionRequest},
    config::{BriefingConfig, PopupMode},
    entry::{CacheEntry, SummaryOutcome},
    identity::PageIdentity,
    profile::{Profile, ProfileRecord},
};

pub use format::format_summary;
pub use poll::{poll_for_fresh, PollOutcome, PollSchedule};
pub use view::{
    Panel, PopupState, PopupView, SummarySource, GENERATING_TEXT, NO_PROFILE_NOTICE,
    TIMED_OUT_TEXT,
};

/// Assistant turn when the backend answers with an error.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Assistant turn when the backend cannot be reached.
pub const CHAT_UNREACHABLE_REPLY: &str = "Sorry, I cannot connect to the server right now.";

/// One popup open.
pub struct PopupSession<S, A, P> {
    id: Uuid,
    address: String,
    identity: PageIdentity,
    store: Arc<S>,
    summarizer: Arc<A>,
    scraper: Arc<P>,
    config: BriefingConfig,
    view: watch::Sender<PopupView>,
    history: Mutex<Vec<PopupState>>,
    profile: Mutex<Option<Profile>>,
    question_pending: AtomicBool,
    cancel: CancellationToken,
    poll: CancellationToken,
}

impl<S, A, P> PopupSession<S, A, P>
where
    S: CacheStore,
    A: Summarizer,
    P: Scraper,
{
    /// Create a session for the active page.
    pub fn new(
        address: impl Into<String>,
        store: Arc<S>,
        summarizer: Arc<A>,
        scraper: Arc<P>,
    ) -> Self {
        let address = address.into();
        let (view, _) = watch::channel(PopupView::default());
        let cancel = CancellationToken::new();

        Self {
            id: Uuid::new_v4(),
            identity: PageIdentity::from_address(&address),
            address,
            store,
            summarizer,
            scraper,
            config: BriefingConfig::default(),
            view,
            history: Mutex::new(vec![PopupState::Opening]),
            profile: Mutex::new(None),
            question_pending: AtomicBool::new(false),
            poll: cancel.child_token(),
            cancel,
        }
    }

    /// Set the session config.
    pub fn with_config(mut self, config: BriefingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identity(&self) -> &PageIdentity {
        &self.identity
    }

    /// Current view.
    pub fn snapshot(&self) -> PopupView {
        self.view.borrow().clone()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<PopupView> {
        self.view.subscribe()
    }

    /// Every state the session has entered, in order.
    pub fn history(&self) -> Vec<PopupState> {
        lock(&self.history).clone()
    }

    /// Profile scraped for this session, if any.
    pub fn profile(&self) -> Option<Profile> {
        lock(&self.profile).clone()
    }

    /// Run the open sequence until the summary panel settles.
    ///
    /// Returns the settled state: `Ready`, `TimedOut`, or `Closed` if the
    /// session was closed while waiting.
    pub async fn open(&self) -> PopupState {
        info!(session = %self.id, identity = %self.identity, "Popup opened");
        self.transition(PopupState::CheckingCache);

        let cached = self.read_fresh().await;

        if let Some(entry) = cached {
            self.transition(PopupState::CacheHit);
            self.show_outcome(&entry.direct, SummarySource::Cache);
            self.transition(PopupState::Ready);
            self.load_profile().await;
            return self.state();
        }

        match self.config.popup_mode {
            PopupMode::AwaitPrefetch => {
                self.transition(PopupState::AwaitingPrefetch);
                self.set_panel(Panel::Generating);
                let (_, settled) = tokio::join!(self.load_profile(), self.await_prefetch());
                settled
            }
            PopupMode::OnDemand => {
                self.transition(PopupState::OnDemandFetch);
                self.set_panel(Panel::Generating);
                self.fetch_direct().await
            }
        }
    }

    /// Retry after the popup gave up waiting or a fetch failed.
    ///
    /// Performs an on-demand direct fetch. Does nothing in other states.
    pub async fn retry(&self) -> PopupState {
        let view = self.snapshot();
        let retryable = view.state == PopupState::TimedOut
            || (view.state == PopupState::Ready && matches!(view.panel, Panel::Error { .. }));
        if !retryable {
            return view.state;
        }

        self.transition(PopupState::OnDemandFetch);
        self.set_panel(Panel::Generating);
        self.fetch_direct().await
    }

    /// Show a web-augmented summary, fetching it live if needed.
    ///
    /// A fresh cached web summary is shown without a call. Otherwise the
    /// web-augmented endpoint is called directly. A pending wait for the
    /// background prefetch is abandoned.
    ///
    /// When a fresh bundle exists the live result replaces its web outcome,
    /// but only if that bundle is still the stored one once the call settles.
    pub async fn request_web_summary(&self) -> Result<()> {
        if self.state() == PopupState::AwaitingPrefetch {
            self.stop_polling();
        }
        let cached = self.read_fresh().await;

        if let Some(text) = cached.as_ref().and_then(|entry| entry.web_augmented.text()) {
            self.set_panel(Panel::Summary {
                text: format_summary(text),
                source: SummarySource::WebCache,
            });
            self.transition(PopupState::Ready);
            return Ok(());
        }

        let profile = self.profile().ok_or(BriefingError::ProfileUnavailable)?;

        self.transition(PopupState::OnDemandFetch);
        self.set_panel(Panel::Generating);

        let result = self.summarizer.web_summarize(&profile).await;
        match &result {
            Ok(text) => self.set_panel(Panel::Summary {
                text: format_summary(text),
                source: SummarySource::WebLive,
            }),
            Err(e) => self.set_panel(Panel::Error {
                message: e.user_message(),
            }),
        }
        self.transition(PopupState::Ready);

        if let Some(entry) = cached {
            self.store_web_outcome(&entry, result).await;
        }

        Ok(())
    }

    /// Write a live web outcome into the bundle it was requested against.
    ///
    /// Skipped when the stored bundle changed during the call.
    async fn store_web_outcome(&self, snapshot: &CacheEntry, result: ServiceResult<String>) {
        let current = match self.store.get(&self.identity).await {
            Ok(Some(current)) if current.created_at == snapshot.created_at => current,
            Ok(_) => {
                debug!(session = %self.id, "Bundle replaced during web summary, not storing");
                return;
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Cache read failed, not storing web summary");
                return;
            }
        };

        let replacement = CacheEntry::at(
            current.created_at,
            current.direct,
            SummaryOutcome::from_result(result),
        );
        if let Err(e) = self.store.put(&self.identity, &replacement).await {
            warn!(session = %self.id, error = %e, "Failed to store web summary");
        }
    }

    /// Ask a follow-up question about the profile.
    ///
    /// The user turn is appended before the call; the assistant turn (or a
    /// failure turn) once it settles. Only one question may be outstanding.
    pub async fn ask(&self, question: &str, use_web_search: bool) -> Result<ChatTurn> {
        let question = question.trim();
        if question.is_empty() {
            return Err(BriefingError::EmptyQuestion);
        }

        let profile = self.profile().ok_or(BriefingError::ProfileUnavailable)?;

        let _pending = PendingQuestion::claim(self)?;

        self.view
            .send_modify(|view| view.transcript.push(ChatTurn::user(question)));

        let request = QuestionRequest::new(profile, question).with_web_search(use_web_search);
        let reply = match self.summarizer.chat(&request).await {
            Ok(answer) => ChatTurn::assistant(answer),
            Err(ServiceError::Unreachable(e)) => {
                warn!(session = %self.id, error = %e, "Chat backend unreachable");
                ChatTurn::assistant(CHAT_UNREACHABLE_REPLY)
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Chat failed");
                ChatTurn::assistant(CHAT_ERROR_REPLY)
            }
        };

        self.view
            .send_modify(|view| view.transcript.push(reply.clone()));
        Ok(reply)
    }

    /// Clear the dismissible notice.
    pub fn dismiss_notice(&self) {
        self.view.send_modify(|view| view.notice = None);
    }

    /// Close the popup. Stops polling; in-flight calls run to completion.
    pub fn close(&self) {
        self.cancel.cancel();
        self.transition(PopupState::Closed);
        debug!(session = %self.id, "Popup closed");
    }

    async fn read_fresh(&self) -> Option<CacheEntry> {
        match self.store.get(&self.identity).await {
            Ok(entry) => fresh_entry(entry, Utc::now(), self.config.freshness_window),
            Err(e) => {
                warn!(session = %self.id, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    fn stop_polling(&self) {
        self.poll.cancel();
    }

    fn state(&self) -> PopupState {
        self.view.borrow().state
    }

    async fn await_prefetch(&self) -> PopupState {
        let schedule = PollSchedule {
            interval: self.config.poll_interval,
            timeout: self.config.poll_timeout,
            freshness_window: self.config.freshness_window,
        };

        let outcome =
            poll_for_fresh(self.store.as_ref(), &self.identity, schedule, &self.poll).await;

        // Another action may have settled the panel while we waited.
        if self.state() != PopupState::AwaitingPrefetch {
            return self.state();
        }

        match outcome {
            PollOutcome::Found(entry) => {
                self.show_outcome(&entry.direct, SummarySource::Prefetch);
                self.transition(PopupState::Ready);
            }
            PollOutcome::TimedOut => {
                info!(session = %self.id, waited = ?self.config.poll_timeout, "Gave up waiting for prefetch");
                self.set_panel(Panel::TimedOut);
                self.transition(PopupState::TimedOut);
            }
            PollOutcome::Cancelled => {}
        }
        self.state()
    }

    async fn fetch_direct(&self) -> PopupState {
        let profile = match self.profile() {
            Some(profile) => Some(profile),
            None => self.load_profile().await,
        };

        let Some(profile) = profile else {
            self.set_panel(Panel::Error {
                message: NO_PROFILE_NOTICE.to_string(),
            });
            self.transition(PopupState::Ready);
            return self.state();
        };

        match self.summarizer.summarize(&profile).await {
            Ok(text) => self.set_panel(Panel::Summary {
                text: format_summary(&text),
                source: SummarySource::OnDemand,
            }),
            Err(e) => {
                warn!(session = %self.id, error = %e, "On-demand summary failed");
                self.set_panel(Panel::Error {
                    message: e.user_message(),
                });
            }
        }
        self.transition(PopupState::Ready);
        self.state()
    }

    /// Scrape the page for chat context. Failures become a notice.
    async fn load_profile(&self) -> Option<Profile> {
        match self.scraper.scrape_profile(&self.address).await {
            ProfileRecord::Success(profile) => {
                *lock(&self.profile) = Some(profile.clone());
                self.view.send_modify(|view| view.profile_loaded = true);
                Some(profile)
            }
            ProfileRecord::Failure { reason } => {
                debug!(session = %self.id, reason = %reason, "Popup scrape failed");
                self.view
                    .send_modify(|view| view.notice = Some(NO_PROFILE_NOTICE.to_string()));
                None
            }
        }
    }

    fn show_outcome(&self, outcome: &SummaryOutcome, source: SummarySource) {
        let panel = match outcome {
            SummaryOutcome::Summary { summary } => Panel::Summary {
                text: format_summary(summary),
                source,
            },
            SummaryOutcome::Error { error } => Panel::Error {
                message: error.clone(),
            },
        };
        self.set_panel(panel);
    }

    fn set_panel(&self, panel: Panel) {
        self.view.send_modify(|view| view.panel = panel);
    }

    /// Enter a state. A closed session stays closed.
    fn transition(&self, state: PopupState) {
        let mut entered = false;
        self.view.send_if_modified(|view| {
            if view.state == PopupState::Closed || view.state == state {
                return false;
            }
            view.state = state;
            entered = true;
            true
        });
        if entered {
            lock(&self.history).push(state);
        }
    }
}

/// Marks a question as outstanding; released on drop.
struct PendingQuestion<'a> {
    flag: &'a AtomicBool,
    view: &'a watch::Sender<PopupView>,
}

impl<'a> PendingQuestion<'a> {
    fn claim<S, A, P>(session: &'a PopupSession<S, A, P>) -> Result<Self> {
        session
            .question_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BriefingError::QuestionPending)?;
        session
            .view
            .send_modify(|view| view.question_pending = true);

        Ok(Self {
            flag: &session.question_pending,
            view: &session.view,
        })
    }
}

impl Drop for PendingQuestion<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.view.send_modify(|view| view.question_pending = false);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::{MockScraper, MockSummarizer};

    fn session(
        summarizer: MockSummarizer,
        scraper: MockScraper,
    ) -> PopupSession<MemoryStore, MockSummarizer, MockScraper> {
        PopupSession::new(
            "https://x/in/jdoe",
            Arc::new(MemoryStore::new()),
            Arc::new(summarizer),
            Arc::new(scraper),
        )
    }

    #[tokio::test]
    async fn test_on_demand_mode_formats_summary() {
        let session = session(
            MockSummarizer::new().with_summary("### Icebreaker Questions\n1. Why?"),
            MockScraper::succeeding(Profile::new("Jane Doe")),
        )
        .with_config(BriefingConfig::default().with_popup_mode(PopupMode::OnDemand));

        assert_eq!(session.open().await, PopupState::Ready);
        assert_eq!(
            session.snapshot().panel.summary_text(),
            Some("**Icebreaker Questions**\n1. Why?")
        );
    }

    #[tokio::test]
    async fn test_on_demand_unreachable_shows_inline_error() {
        let session = session(
            MockSummarizer::new().with_summary_error(ServiceError::Unreachable("refused".into())),
            MockScraper::succeeding(Profile::new("Jane Doe")),
        )
        .with_config(BriefingConfig::default().with_popup_mode(PopupMode::OnDemand));

        session.open().await;
        assert_eq!(
            session.snapshot().panel,
            Panel::Error {
                message: crate::error::UNREACHABLE_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let session = session(MockSummarizer::new(), MockScraper::failing("none"));
        let err = session.ask("   ", false).await.unwrap_err();
        assert!(matches!(err, BriefingError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_question_without_profile_rejected() {
        let session = session(MockSummarizer::new(), MockScraper::failing("none"));
        let err = session.ask("Where did they study?", false).await.unwrap_err();
        assert!(matches!(err, BriefingError::ProfileUnavailable));
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let session = session(MockSummarizer::new(), MockScraper::failing("none"));
        session.close();
        session.transition(PopupState::Ready);
        assert_eq!(session.snapshot().state, PopupState::Closed);
    }
}
