//! Testing utilities including mock implementations.
//!
//! These are useful for testing hosts of the briefing library without
//! making real scrapes or summarization calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{Result, ServiceError, ServiceResult};
use crate::traits::{
    scraper::Scraper, signal::CompletionSignal, store::CacheStore, summarizer::Summarizer,
};
use crate::types::{
    chat::QuestionRequest,
    entry::CacheEntry,
    identity::PageIdentity,
    profile::{Profile, ProfileRecord},
};

/// A mock summarization backend.
///
/// Returns scripted outcomes for each endpoint and records every call.
/// An optional latency is applied with `tokio::time::sleep`, so it follows
/// paused test time.
pub struct MockSummarizer {
    summary: RwLock<ServiceResult<String>>,
    web_summary: RwLock<ServiceResult<String>>,
    answer: RwLock<ServiceResult<String>>,
    latency: Duration,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockSummarizerCall>>>,
}

/// Record of a call made to the mock summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSummarizerCall {
    Summarize { name: String },
    WebSummarize { name: String },
    Chat { question: String, use_web_search: bool },
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSummarizer {
    /// Create a mock that succeeds on every endpoint.
    pub fn new() -> Self {
        Self {
            summary: RwLock::new(Ok("Direct summary".to_string())),
            web_summary: RwLock::new(Ok("Web summary".to_string())),
            answer: RwLock::new(Ok("Answer".to_string())),
            latency: Duration::ZERO,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the direct summary text.
    pub fn with_summary(self, text: impl Into<String>) -> Self {
        *self.summary.write().unwrap() = Ok(text.into());
        self
    }

    /// Make the direct summary fail.
    pub fn with_summary_error(self, err: ServiceError) -> Self {
        *self.summary.write().unwrap() = Err(err);
        self
    }

    /// Set the web-augmented summary text.
    pub fn with_web_summary(self, text: impl Into<String>) -> Self {
        *self.web_summary.write().unwrap() = Ok(text.into());
        self
    }

    /// Make the web-augmented summary fail.
    pub fn with_web_summary_error(self, err: ServiceError) -> Self {
        *self.web_summary.write().unwrap() = Err(err);
        self
    }

    /// Set the chat answer.
    pub fn with_answer(self, text: impl Into<String>) -> Self {
        *self.answer.write().unwrap() = Ok(text.into());
        self
    }

    /// Make chat fail.
    pub fn with_chat_error(self, err: ServiceError) -> Self {
        *self.answer.write().unwrap() = Err(err);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockSummarizerCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made to any endpoint.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of direct summary calls.
    pub fn summarize_count(&self) -> usize {
        self.count(|call| matches!(call, MockSummarizerCall::Summarize { .. }))
    }

    /// Number of web-augmented summary calls.
    pub fn web_summarize_count(&self) -> usize {
        self.count(|call| matches!(call, MockSummarizerCall::WebSummarize { .. }))
    }

    /// Number of chat calls.
    pub fn chat_count(&self) -> usize {
        self.count(|call| matches!(call, MockSummarizerCall::Chat { .. }))
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn count(&self, pred: impl Fn(&MockSummarizerCall) -> bool) -> usize {
        self.calls.read().unwrap().iter().filter(|c| pred(c)).count()
    }

    async fn respond(
        &self,
        call: MockSummarizerCall,
        outcome: &RwLock<ServiceResult<String>>,
    ) -> ServiceResult<String> {
        self.calls.write().unwrap().push(call);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        outcome.read().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, profile: &Profile) -> ServiceResult<String> {
        let call = MockSummarizerCall::Summarize {
            name: profile.name.clone(),
        };
        self.respond(call, &self.summary).await
    }

    async fn web_summarize(&self, profile: &Profile) -> ServiceResult<String> {
        let call = MockSummarizerCall::WebSummarize {
            name: profile.name.clone(),
        };
        self.respond(call, &self.web_summary).await
    }

    async fn chat(&self, request: &QuestionRequest) -> ServiceResult<String> {
        let call = MockSummarizerCall::Chat {
            question: request.question.clone(),
            use_web_search: request.use_web_search,
        };
        self.respond(call, &self.answer).await
    }
}

/// A mock scraper with a scripted sequence of records.
///
/// Returns the records in order and repeats the last one once exhausted.
pub struct MockScraper {
    records: Vec<ProfileRecord>,
    latency: Duration,
    calls: AtomicUsize,
}

impl MockScraper {
    /// Scraper that always finds this profile.
    pub fn succeeding(profile: Profile) -> Self {
        Self::scripted(vec![ProfileRecord::Success(profile)])
    }

    /// Scraper that never finds a profile.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::scripted(vec![ProfileRecord::failure(reason)])
    }

    /// Scraper returning `records` in order.
    pub fn scripted(records: Vec<ProfileRecord>) -> Self {
        Self {
            records,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every scrape by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of scrapes performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scraper for MockScraper {
    async fn scrape_profile(&self, _address: &str) -> ProfileRecord {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.records
            .get(index)
            .or_else(|| self.records.last())
            .cloned()
            .unwrap_or_else(|| ProfileRecord::failure("no scripted record"))
    }
}

/// Store wrapper that counts operations and keeps every written bundle.
pub struct CountingStore<S> {
    inner: S,
    reads: AtomicUsize,
    removes: AtomicUsize,
    writes: RwLock<Vec<(PageIdentity, CacheEntry)>>,
}

impl<S: CacheStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            writes: RwLock::new(Vec::new()),
        }
    }

    /// Number of `get` calls.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `remove` calls.
    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    /// Every bundle passed to `put`, in order.
    pub fn writes(&self) -> Vec<(PageIdentity, CacheEntry)> {
        self.writes.read().unwrap().clone()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for CountingStore<S> {
    async fn get(&self, identity: &PageIdentity) -> Result<Option<CacheEntry>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(identity).await
    }

    async fn put(&self, identity: &PageIdentity, entry: &CacheEntry) -> Result<()> {
        self.writes
            .write()
            .unwrap()
            .push((identity.clone(), entry.clone()));
        self.inner.put(identity, entry).await
    }

    async fn remove(&self, identity: &PageIdentity) -> Result<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(identity).await
    }
}

/// Badge transition recorded by [`RecordingSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Shown,
    Cleared,
}

/// Completion signal that records every transition.
#[derive(Default)]
pub struct RecordingSignal {
    events: RwLock<Vec<(SignalEvent, PageIdentity)>>,
}

impl RecordingSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(SignalEvent, PageIdentity)> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait]
impl CompletionSignal for RecordingSignal {
    async fn show(&self, identity: &PageIdentity) {
        self.events
            .write()
            .unwrap()
            .push((SignalEvent::Shown, identity.clone()));
    }

    async fn clear(&self, identity: &PageIdentity) {
        self.events
            .write()
            .unwrap()
            .push((SignalEvent::Cleared, identity.clone()));
    }
}
