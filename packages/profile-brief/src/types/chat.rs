//! Chat types for follow-up questions.

use serde::{Deserialize, Serialize};

use super::profile::Profile;

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One exchange in a popup session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A question about a profile. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    /// Snapshot of the profile at submission time
    pub profile: Profile,

    /// Trimmed question text
    pub question: String,

    /// Whether the answer may use live web search
    pub use_web_search: bool,
}

impl QuestionRequest {
    pub fn new(profile: Profile, question: impl Into<String>) -> Self {
        Self {
            profile,
            question: question.into(),
            use_web_search: false,
        }
    }

    /// Request web augmentation for the answer.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.use_web_search = enabled;
        self
    }
}
