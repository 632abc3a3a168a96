//! Typed errors for the briefing library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so hosts can match on
//! the outcome that reached them.

use thiserror::Error;

/// Errors surfaced by the coordinators and the popup session.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// No identifiable profile on the current page
    #[error("scrape failed: {reason}")]
    Scrape { reason: String },

    /// Summarization backend failed
    #[error("summarization service error: {0}")]
    Service(#[from] ServiceError),

    /// Cache store operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A profile is required but none has been scraped yet
    #[error("profile not loaded yet")]
    ProfileUnavailable,

    /// A question is already outstanding for this session
    #[error("a question is already pending")]
    QuestionPending,

    /// Question text was empty after trimming
    #[error("question is empty")]
    EmptyQuestion,

    /// The background worker is no longer receiving messages
    #[error("background worker has stopped")]
    WorkerStopped,

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the summarization service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport failure (connection refused, DNS, timeout)
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Backend answered with an error body or a non-2xx status
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Backend answered with a body we could not interpret
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl BriefingError {
    /// Wrap any storage-layer error.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Shown when the summarization backend cannot be reached.
pub const UNREACHABLE_MESSAGE: &str = "Backend unreachable.";

impl ServiceError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Malformed(_) => self.to_string(),
        }
    }
}

/// Result type alias for briefing operations.
pub type Result<T> = std::result::Result<T, BriefingError>;

/// Result type alias for summarization service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
