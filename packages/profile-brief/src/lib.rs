//! Profile Briefing Library
//!
//! Prefetch-and-cache coordination for profile page briefings. A page load
//! scrapes the profile and fills the cache in the background; the popup
//! reads the cache, waits for an in-flight prefetch, or fetches on demand,
//! and answers follow-up questions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use profile_brief::{MemoryStore, PopupSession, PrefetchCoordinator};
//! use profile_brief::testing::{MockScraper, MockSummarizer};
//!
//! let store = Arc::new(MemoryStore::new());
//! let summarizer = Arc::new(MockSummarizer::new());
//! let scraper = Arc::new(MockScraper::succeeding(Profile::new("Jane Doe")));
//!
//! // Background: one run per page load
//! let coordinator = PrefetchCoordinator::new(store.clone(), summarizer.clone(), scraper.clone());
//! coordinator.run("https://x/in/jdoe?trk=feed").await?;
//!
//! // Popup: shows the cached direct summary without a network call
//! let session = PopupSession::new("https://x/in/jdoe", store, summarizer, scraper);
//! session.open().await;
//! println!("{}", session.snapshot().panel.text());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Store, summarizer, scraper and signal abstractions
//! - [`types`] - Profiles, identities, cache entries, chat and config
//! - [`freshness`] - The single freshness rule
//! - [`stores`] - Storage implementations (MemoryStore, SqliteStore)
//! - [`prefetch`] - Background prefetch coordinator
//! - [`agent`] - Page context and background worker
//! - [`popup`] - Popup session controller
//! - [`scraping`] - HTML profile scraper
//! - [`relay`] - HTTP summarization client
//! - [`testing`] - Mock implementations for testing

pub mod agent;
pub mod error;
pub mod freshness;
pub mod popup;
pub mod prefetch;
pub mod relay;
pub mod scraping;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{BriefingError, Result, ServiceError, ServiceResult};
pub use freshness::{fresh_entry, is_fresh, DEFAULT_FRESHNESS_WINDOW};
pub use traits::{
    scraper::Scraper,
    signal::{CompletionSignal, LogSignal, NoopSignal},
    store::CacheStore,
    summarizer::Summarizer,
};
pub use types::{
    chat::{ChatRole, ChatTurn, QuestionRequest},
    config::{BriefingConfig, PopupMode},
    entry::{CacheEntry, SummaryOutcome},
    identity::{PageIdentity, SUMMARY_KEY_PREFIX},
    profile::{Profile, ProfileRecord},
};

// Re-export coordinators
pub use agent::{spawn_background, BackgroundHandle, BackgroundMessage, PageAgent};
pub use popup::{Panel, PopupSession, PopupState, PopupView, SummarySource};
pub use prefetch::{PageLoadGuard, PrefetchCoordinator, PrefetchOutcome};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

// Re-export I/O adapters
pub use relay::RelayClient;
pub use scraping::{DocumentSource, HtmlProfileScraper, HttpDocumentSource, StaticDocument};
