//! SQLite-backed semantic cache store

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::warn;

use crate::domain::embedding::{decode_embedding, encode_embedding};
use crate::domain::llm::ProviderKind;
use crate::domain::semantic_cache::{CacheEntry, SemanticCacheStore};
use crate::domain::DomainError;

const TABLE: &str = "semantic_cache";

/// Cache store persisted in a SQLite database.
///
/// Embeddings are stored as little-endian f32 blobs, timestamps as unix
/// milliseconds so recency ordering is a plain integer comparison. A row
/// whose blob fails to decode is skipped, not fatal: one corrupt entry must
/// not poison the whole partition.
#[derive(Debug)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite://lorebase-cache.db`, and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DomainError::cache(format!("Invalid SQLite url '{}': {}", url, e)))?
            .create_if_missing(true);

        // SQLite serializes writers; one connection avoids lock churn
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to open SQLite database: {}", e)))?;

        let store = Self { pool };
        store.ensure_schema().await?;

        Ok(store)
    }

    /// Throwaway database for tests
    pub async fn in_memory() -> Result<Self, DomainError> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<(), DomainError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TABLE} (
                id TEXT PRIMARY KEY,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                query_text TEXT NOT NULL,
                query_embedding BLOB NOT NULL,
                response TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                last_used_at INTEGER NOT NULL
            )
            "#
        );

        sqlx::query(&create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to create cache table: {}", e)))?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{TABLE}_partition \
             ON {TABLE} (provider, model, last_used_at)"
        );

        sqlx::query(&create_index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to create cache index: {}", e)))?;

        Ok(())
    }

    fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CacheEntry, DomainError> {
        let id: String = row.get("id");
        let provider: String = row.get("provider");
        let embedding_blob: Vec<u8> = row.get("query_embedding");
        let created_at: i64 = row.get("created_at");
        let last_used_at: i64 = row.get("last_used_at");

        let provider = ProviderKind::from_str(&provider)
            .map_err(|e| DomainError::cache(format!("Row '{}': {}", id, e)))?;
        let query_embedding = decode_embedding(&embedding_blob)?;

        Ok(CacheEntry::from_row(
            id,
            query_embedding,
            row.get::<String, _>("query_text"),
            row.get::<String, _>("response"),
            provider,
            row.get::<String, _>("model"),
            millis_to_datetime(created_at)?,
            millis_to_datetime(last_used_at)?,
        ))
    }
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DomainError::cache(format!("Timestamp out of range: {}", millis)))
}

#[async_trait]
impl SemanticCacheStore for SqliteCacheStore {
    async fn recent(
        &self,
        provider: ProviderKind,
        model: &str,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, DomainError> {
        let query = format!(
            "SELECT id, provider, model, query_text, query_embedding, response, \
             created_at, last_used_at \
             FROM {TABLE} WHERE provider = ? AND model = ? \
             ORDER BY last_used_at DESC LIMIT ?"
        );

        let rows = sqlx::query(&query)
            .bind(provider.as_str())
            .bind(model)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to load cache rows: {}", e)))?;

        let mut entries = Vec::with_capacity(rows.len());

        for row in &rows {
            match Self::entry_from_row(row) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    warn!(%error, "Skipping corrupt cache row");
                }
            }
        }

        Ok(entries)
    }

    async fn insert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let query = format!(
            "INSERT INTO {TABLE} \
             (id, provider, model, query_text, query_embedding, response, created_at, last_used_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        );

        sqlx::query(&query)
            .bind(entry.id())
            .bind(entry.provider().as_str())
            .bind(entry.model())
            .bind(entry.query_text())
            .bind(encode_embedding(entry.query_embedding()))
            .bind(entry.response())
            .bind(entry.created_at().timestamp_millis())
            .bind(entry.last_used_at().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to insert cache row: {}", e)))?;

        Ok(())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError> {
        let query = format!("UPDATE {TABLE} SET last_used_at = ? WHERE id = ?");

        sqlx::query(&query)
            .bind(at.timestamp_millis())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to touch cache row: {}", e)))?;

        Ok(())
    }

    async fn count(&self, provider: ProviderKind, model: &str) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) AS n FROM {TABLE} WHERE provider = ? AND model = ?");

        let row = sqlx::query(&query)
            .bind(provider.as_str())
            .bind(model)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to count cache rows: {}", e)))?;

        let count: i64 = row.get("n");

        Ok(count as usize)
    }

    async fn evict_down_to(
        &self,
        provider: ProviderKind,
        model: &str,
        keep: usize,
    ) -> Result<usize, DomainError> {
        let query = format!(
            "DELETE FROM {TABLE} \
             WHERE provider = ? AND model = ? AND id NOT IN ( \
                 SELECT id FROM {TABLE} WHERE provider = ? AND model = ? \
                 ORDER BY last_used_at DESC LIMIT ? \
             )"
        );

        let result = sqlx::query(&query)
            .bind(provider.as_str())
            .bind(model)
            .bind(provider.as_str())
            .bind(model)
            .bind(keep as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to evict cache rows: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let query = format!("DELETE FROM {TABLE}");

        let result = sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to clear cache: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }
}
