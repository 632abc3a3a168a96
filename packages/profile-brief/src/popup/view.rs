//! Observable popup view.

use serde::Serialize;

use crate::types::chat::ChatTurn;

/// Placeholder text while a summary is being generated.
pub const GENERATING_TEXT: &str = "Generating summary...";

/// Terminal message when the popup gives up waiting.
pub const TIMED_OUT_TEXT: &str = "This is taking longer than expected. Please retry.";

/// Notice shown when the page has no identifiable profile.
pub const NO_PROFILE_NOTICE: &str = "Switch to a LinkedIn profile then try again.";

/// Popup session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupState {
    Opening,
    CheckingCache,
    CacheHit,
    AwaitingPrefetch,
    OnDemandFetch,
    Ready,
    /// Gave up waiting for the background prefetch
    TimedOut,
    Closed,
}

impl PopupState {
    /// Whether the session has stopped changing on its own.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::TimedOut | Self::Closed)
    }
}

/// Where a displayed summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Fresh bundle found at open
    Cache,
    /// Bundle written by the background while polling
    Prefetch,
    /// Direct summary fetched by the popup itself
    OnDemand,
    /// Web-augmented summary from a fresh bundle
    WebCache,
    /// Web-augmented summary fetched live
    WebLive,
}

/// Main summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Panel {
    Empty,
    Generating,
    Summary { text: String, source: SummarySource },
    Error { message: String },
    TimedOut,
}

impl Panel {
    /// Panel text as shown to the user.
    pub fn text(&self) -> &str {
        match self {
            Panel::Empty => "",
            Panel::Generating => GENERATING_TEXT,
            Panel::Summary { text, .. } => text,
            Panel::Error { message } => message,
            Panel::TimedOut => TIMED_OUT_TEXT,
        }
    }

    pub fn summary_text(&self) -> Option<&str> {
        match self {
            Panel::Summary { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Everything a UI needs to render the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupView {
    pub state: PopupState,
    pub panel: Panel,

    /// Dismissible message, such as a scrape failure
    pub notice: Option<String>,

    /// Chat transcript for this session
    pub transcript: Vec<ChatTurn>,

    /// True while a question is outstanding; input is disabled
    pub question_pending: bool,

    /// Whether a profile is available for questions
    pub profile_loaded: bool,
}

impl Default for PopupView {
    fn default() -> Self {
        Self {
            state: PopupState::Opening,
            panel: Panel::Empty,
            notice: None,
            transcript: Vec::new(),
            question_pending: false,
            profile_loaded: false,
        }
    }
}

impl PopupView {
    /// Whether the question input accepts submissions.
    pub fn can_ask(&self) -> bool {
        self.profile_loaded && !self.question_pending
    }
}
