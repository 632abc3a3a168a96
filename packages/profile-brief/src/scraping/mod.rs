//! HTML profile scraper.
//!
//! [`HtmlProfileScraper`] reads a page through a [`DocumentSource`], runs
//! the ranked name strategies, and extracts the remaining fields. Pages
//! often render the header late, so the read is retried on a fixed
//! interval until a name appears or the wait budget runs out.

pub mod html;
pub mod source;
pub mod strategies;

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::traits::scraper::Scraper;
use crate::types::{config::BriefingConfig, profile::ProfileRecord};

pub use html::parse_profile;
pub use source::{DocumentSource, HttpDocumentSource, StaticDocument};
pub use strategies::{find_name, NameStrategy, NAME_STRATEGIES};

/// Failure reason when no name appears within the wait budget.
pub const NAME_NOT_FOUND: &str = "Could not detect profile name after waiting.";

/// Scraper over HTML documents.
pub struct HtmlProfileScraper<D> {
    source: D,
    max_wait: Duration,
    retry_interval: Duration,
}

impl<D: DocumentSource> HtmlProfileScraper<D> {
    /// Create a scraper with a 2 second budget and 100 ms retries.
    pub fn new(source: D) -> Self {
        Self::from_config(source, &BriefingConfig::default())
    }

    /// Create a scraper using the config's wait budget.
    pub fn from_config(source: D, config: &BriefingConfig) -> Self {
        Self {
            source,
            max_wait: config.scrape_max_wait,
            retry_interval: config.scrape_retry_interval,
        }
    }

    /// Set the wait budget and retry interval.
    pub fn with_wait(mut self, max_wait: Duration, retry_interval: Duration) -> Self {
        self.max_wait = max_wait;
        self.retry_interval = retry_interval;
        self
    }

    pub fn source(&self) -> &D {
        &self.source
    }
}

#[async_trait]
impl<D: DocumentSource> Scraper for HtmlProfileScraper<D> {
    async fn scrape_profile(&self, address: &str) -> ProfileRecord {
        let deadline = Instant::now() + self.max_wait;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.source.fetch(address).await {
                Ok(html) => {
                    if let Some(profile) = parse_profile(&html) {
                        debug!(address = %address, attempts, name = %profile.name, "Profile scraped");
                        return ProfileRecord::from_profile(profile);
                    }
                }
                Err(e) => debug!(address = %address, error = %e, "Document read failed"),
            }

            if Instant::now() >= deadline {
                break;
            }
            sleep(self.retry_interval).await;
        }

        debug!(address = %address, attempts, "No profile name found");
        ProfileRecord::failure(NAME_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_wait_budget() {
        let scraper = HtmlProfileScraper::new(StaticDocument::new("<p>loading</p>"));
        let started = Instant::now();

        let record = scraper.scrape_profile("https://x/in/jdoe").await;

        assert_eq!(record, ProfileRecord::failure(NAME_NOT_FOUND));
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_picks_up_late_render() {
        let document = Arc::new(StaticDocument::new("<p>loading</p>"));
        let scraper = HtmlProfileScraper::new(Arc::clone(&document));

        let late = Arc::clone(&document);
        tokio::spawn(async move {
            sleep(Duration::from_millis(450)).await;
            late.set_html("<h1>Jane Doe</h1>");
        });

        let record = scraper.scrape_profile("https://x/in/jdoe").await;
        assert_eq!(record.profile().map(|p| p.name.as_str()), Some("Jane Doe"));
    }
}
