//! Summarization service trait.
//!
//! The service is an external collaborator: it turns a profile into text.
//! Implementations wrap a specific backend (the HTTP relay, a test double)
//! and map its failures onto [`ServiceError`](crate::error::ServiceError).

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ServiceResult;
use crate::types::{chat::QuestionRequest, profile::Profile};

/// Language-model backend used by both coordinators.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summary from the scraped profile data only.
    async fn summarize(&self, profile: &Profile) -> ServiceResult<String>;

    /// Summary built from a profile-derived web search.
    ///
    /// The backend is instructed to prefer search results over the scraped
    /// data when they conflict.
    async fn web_summarize(&self, profile: &Profile) -> ServiceResult<String>;

    /// Answer a follow-up question about a profile.
    async fn chat(&self, request: &QuestionRequest) -> ServiceResult<String>;
}

#[async_trait]
impl<T: Summarizer + ?Sized> Summarizer for Arc<T> {
    async fn summarize(&self, profile: &Profile) -> ServiceResult<String> {
        (**self).summarize(profile).await
    }

    async fn web_summarize(&self, profile: &Profile) -> ServiceResult<String> {
        (**self).web_summarize(profile).await
    }

    async fn chat(&self, request: &QuestionRequest) -> ServiceResult<String> {
        (**self).chat(request).await
    }
}
