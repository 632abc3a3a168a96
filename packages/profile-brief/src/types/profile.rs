//! Profile types - the result of scraping one page.

use serde::{Deserialize, Serialize};

/// Data scraped from a profile page.
///
/// Only produced for successful scrapes, so `name` is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Identity name shown in the page header
    pub name: String,

    /// One-line headline under the name
    #[serde(default)]
    pub headline: String,

    /// Location line
    #[serde(default)]
    pub location: String,

    /// Education entries, one per list item
    #[serde(default)]
    pub education: Vec<String>,

    /// Experience entries, one per list item
    #[serde(default)]
    pub experience: Vec<String>,

    /// Patent mentions
    #[serde(default)]
    pub patents: Vec<String>,

    /// Activity mentions
    #[serde(default)]
    pub activities: Vec<String>,

    /// All visible page text, used as fallback context
    #[serde(default)]
    pub full_text: String,
}

impl Profile {
    /// Create a profile with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the headline.
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Add an experience entry.
    pub fn with_experience(mut self, entry: impl Into<String>) -> Self {
        self.experience.push(entry.into());
        self
    }

    /// Add an education entry.
    pub fn with_education(mut self, entry: impl Into<String>) -> Self {
        self.education.push(entry.into());
        self
    }

    /// Set the visible page text.
    pub fn with_full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    /// Search query for the web-augmented summary.
    pub fn search_query(&self) -> String {
        [self.name.as_str(), self.headline.as_str(), self.location.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of one scrape attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRecord {
    Success(Profile),
    Failure { reason: String },
}

impl ProfileRecord {
    /// Build a record, downgrading to `Failure` when the name is blank.
    pub fn from_profile(profile: Profile) -> Self {
        if profile.name.trim().is_empty() {
            Self::failure("profile has no name")
        } else {
            Self::Success(profile)
        }
    }

    /// Create a failure record.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Check whether the scrape succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Get the profile if the scrape succeeded.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Success(profile) => Some(profile),
            Self::Failure { .. } => None,
        }
    }

    /// Consume into the profile, or the failure reason.
    pub fn into_result(self) -> std::result::Result<Profile, String> {
        match self {
            Self::Success(profile) => Ok(profile),
            Self::Failure { reason } => Err(reason),
        }
    }
}

/// Wire form of a profile sent to the summarization backend.
///
/// The backend rejects payloads without `success: true`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload<'a> {
    success: bool,
    #[serde(flatten)]
    profile: &'a Profile,
}

impl<'a> From<&'a Profile> for ProfilePayload<'a> {
    fn from(profile: &'a Profile) -> Self {
        Self {
            success: true,
            profile,
        }
    }
}
