//! In-memory cache store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{BriefingError, Result};
use crate::traits::store::CacheStore;
use crate::types::{entry::CacheEntry, identity::PageIdentity};

/// Process-wide summary store backed by a hash map.
///
/// Lives as long as the process, so it outlasts every popup session but not
/// a restart. Entries are keyed by their storage key (`summary:<identity>`).
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Clear all stored bundles.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Get the number of stored bundles.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> BriefingError {
    BriefingError::storage(err.to_string())
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, identity: &PageIdentity) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(&identity.storage_key()).cloned())
    }

    async fn put(&self, identity: &PageIdentity, entry: &CacheEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(identity.storage_key(), entry.clone());
        Ok(())
    }

    async fn remove(&self, identity: &PageIdentity) -> Result<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .remove(&identity.storage_key());
        Ok(())
    }
}
