//! Cache entry types - timestamped summary bundles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;

/// Result of one summarization call as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    Summary { summary: String },
    Error { error: String },
}

impl SummaryOutcome {
    /// Successful outcome.
    pub fn summary(text: impl Into<String>) -> Self {
        Self::Summary {
            summary: text.into(),
        }
    }

    /// Failed outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Capture a service call result.
    pub fn from_result(result: ServiceResult<String>) -> Self {
        match result {
            Ok(text) => Self::summary(text),
            Err(err) => Self::error(err.user_message()),
        }
    }

    /// Summary text if the call succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Summary { summary } => Some(summary),
            Self::Error { .. } => None,
        }
    }

    /// Error message if the call failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Summary { .. } => None,
            Self::Error { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Persisted bundle for one page identity.
///
/// Both outcomes are always present; the bundle is built in full before
/// it is written and is never patched afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// When the bundle was produced (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Summary from profile data only
    pub direct: SummaryOutcome,

    /// Summary that prefers live search results
    pub web_augmented: SummaryOutcome,
}

impl CacheEntry {
    /// Create a bundle stamped with the current time.
    pub fn new(direct: SummaryOutcome, web_augmented: SummaryOutcome) -> Self {
        Self::at(Utc::now(), direct, web_augmented)
    }

    /// Create a bundle with an explicit timestamp.
    pub fn at(
        created_at: DateTime<Utc>,
        direct: SummaryOutcome,
        web_augmented: SummaryOutcome,
    ) -> Self {
        Self {
            created_at,
            direct,
            web_augmented,
        }
    }

    /// Check whether both summarization calls failed.
    pub fn all_failed(&self) -> bool {
        self.direct.is_error() && self.web_augmented.is_error()
    }

    /// Serialize to the persisted JSON layout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the persisted JSON layout.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
