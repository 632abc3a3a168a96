//! Scraper trait - turns the current page into a profile record.

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::profile::ProfileRecord;

/// Produces a profile record for a page address.
///
/// Implementations retry internally for a bounded time and return
/// `ProfileRecord::Failure` when no profile can be identified. They never
/// return an error: every failure is a record.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape_profile(&self, address: &str) -> ProfileRecord;
}

#[async_trait]
impl<T: Scraper + ?Sized> Scraper for Arc<T> {
    async fn scrape_profile(&self, address: &str) -> ProfileRecord {
        (**self).scrape_profile(address).await
    }
}
