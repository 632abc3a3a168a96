//! SQLite cache store.
//!
//! A file-based backend using SQLite. Bundles are stored as their persisted
//! JSON layout, one row per storage key, so a row is always a whole bundle.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{BriefingError, Result};
use crate::traits::store::CacheStore;
use crate::types::{entry::CacheEntry, identity::PageIdentity};

/// SQLite-based summary store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://brief.db?mode=rwc` - File-based, create if not exists
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, 5).await
    }

    /// Create an in-memory SQLite store (for testing).
    ///
    /// Each SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to a single connection.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(BriefingError::storage)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(BriefingError::storage)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Delete every stored bundle.
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await
            .map_err(BriefingError::storage)?;
        Ok(result.rows_affected())
    }

    /// List stored identities, newest first.
    pub async fn identities(&self) -> Result<Vec<PageIdentity>> {
        let keys: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM cache_entries ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(BriefingError::storage)?;

        Ok(keys
            .into_iter()
            .filter_map(|(key,)| PageIdentity::from_storage_key(&key))
            .collect())
    }
}

#[derive(Debug, FromRow)]
struct EntryRow {
    value: String,
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get(&self, identity: &PageIdentity) -> Result<Option<CacheEntry>> {
        let row: Option<EntryRow> =
            sqlx::query_as("SELECT value FROM cache_entries WHERE key = ?")
                .bind(identity.storage_key())
                .fetch_optional(&self.pool)
                .await
                .map_err(BriefingError::storage)?;

        row.map(|row| CacheEntry::from_json(&row.value))
            .transpose()
            .map_err(Into::into)
    }

    async fn put(&self, identity: &PageIdentity, entry: &CacheEntry) -> Result<()> {
        let value = entry.to_json()?;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                created_at = excluded.created_at
            "#,
        )
        .bind(identity.storage_key())
        .bind(value)
        .bind(entry.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(BriefingError::storage)?;

        Ok(())
    }

    async fn remove(&self, identity: &PageIdentity) -> Result<()> {
        sqlx::query("DELETE FROM cache_entries WHERE key = ?")
            .bind(identity.storage_key())
            .execute(&self.pool)
            .await
            .map_err(BriefingError::storage)?;

        Ok(())
    }
}
