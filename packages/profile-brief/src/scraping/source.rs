//! Where the scraper reads page HTML from.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

use crate::error::{BriefingError, Result};

/// Supplies the current HTML of a page.
///
/// The scraper reads the document once per attempt, so a source backed by
/// a live page sees content that renders late.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<String>;
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for Arc<T> {
    async fn fetch(&self, address: &str) -> Result<String> {
        (**self).fetch(address).await
    }
}

/// A fixed HTML snapshot, replaceable between attempts.
#[derive(Debug, Default)]
pub struct StaticDocument {
    html: RwLock<String>,
}

impl StaticDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: RwLock::new(html.into()),
        }
    }

    /// Replace the snapshot, as a page does when it finishes rendering.
    pub fn set_html(&self, html: impl Into<String>) {
        match self.html.write() {
            Ok(mut current) => *current = html.into(),
            Err(poisoned) => *poisoned.into_inner() = html.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for StaticDocument {
    async fn fetch(&self, _address: &str) -> Result<String> {
        let html = self
            .html
            .read()
            .map_err(|e| BriefingError::Scrape {
                reason: e.to_string(),
            })?
            .clone();
        Ok(html)
    }
}

/// Fetches the page over HTTP.
pub struct HttpDocumentSource {
    client: reqwest::Client,
}

impl HttpDocumentSource {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(15))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BriefingError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, address: &str) -> Result<String> {
        let url = Url::parse(address).map_err(|e| BriefingError::Scrape {
            reason: format!("invalid page address {address}: {e}"),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| BriefingError::Scrape {
                reason: e.to_string(),
            })?;

        response.text().await.map_err(|e| BriefingError::Scrape {
            reason: e.to_string(),
        })
    }
}
