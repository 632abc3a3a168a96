//! Cache store trait for summary bundles.
//!
//! The store is the only state shared between the background coordinator
//! and popup sessions. Writers always hand over a complete [`CacheEntry`],
//! so implementations only need single-key atomicity.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{entry::CacheEntry, identity::PageIdentity};

/// Durable key/value store keyed by page identity.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the current bundle for a page, fresh or not.
    async fn get(&self, identity: &PageIdentity) -> Result<Option<CacheEntry>>;

    /// Replace the bundle for a page in one write. Last writer wins.
    async fn put(&self, identity: &PageIdentity, entry: &CacheEntry) -> Result<()>;

    /// Drop the bundle for a page.
    async fn remove(&self, identity: &PageIdentity) -> Result<()>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, identity: &PageIdentity) -> Result<Option<CacheEntry>> {
        (**self).get(identity).await
    }

    async fn put(&self, identity: &PageIdentity, entry: &CacheEntry) -> Result<()> {
        (**self).put(identity, entry).await
    }

    async fn remove(&self, identity: &PageIdentity) -> Result<()> {
        (**self).remove(identity).await
    }
}
