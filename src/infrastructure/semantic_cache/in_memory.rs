//! In-memory semantic cache store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::llm::ProviderKind;
use crate::domain::semantic_cache::{CacheEntry, SemanticCacheStore};
use crate::domain::DomainError;

/// Cache store backed by a process-local map.
///
/// Linear scans over each partition; fine for the partition sizes the
/// capacity ceiling allows. Used by tests and as the no-persistence
/// fallback when no database path is configured.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::cache(format!("Failed to acquire read lock: {}", e))
    }

    fn write_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::cache(format!("Failed to acquire write lock: {}", e))
    }

    fn in_partition(entry: &CacheEntry, provider: ProviderKind, model: &str) -> bool {
        entry.provider() == provider && entry.model() == model
    }
}

#[async_trait]
impl SemanticCacheStore for InMemoryCacheStore {
    async fn recent(
        &self,
        provider: ProviderKind,
        model: &str,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, DomainError> {
        let entries = self.entries.read().map_err(Self::read_error)?;

        let mut partition: Vec<CacheEntry> = entries
            .values()
            .filter(|entry| Self::in_partition(entry, provider, model))
            .cloned()
            .collect();

        partition.sort_by(|a, b| b.last_used_at().cmp(&a.last_used_at()));
        partition.truncate(limit);

        Ok(partition)
    }

    async fn insert(&self, entry: CacheEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(Self::write_error)?;

        entries.insert(entry.id().to_string(), entry);

        Ok(())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(Self::write_error)?;

        if let Some(entry) = entries.get_mut(id) {
            entry.touch(at);
        }

        Ok(())
    }

    async fn count(&self, provider: ProviderKind, model: &str) -> Result<usize, DomainError> {
        let entries = self.entries.read().map_err(Self::read_error)?;

        Ok(entries
            .values()
            .filter(|entry| Self::in_partition(entry, provider, model))
            .count())
    }

    async fn evict_down_to(
        &self,
        provider: ProviderKind,
        model: &str,
        keep: usize,
    ) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(Self::write_error)?;

        let mut partition: Vec<(String, DateTime<Utc>)> = entries
            .values()
            .filter(|entry| Self::in_partition(entry, provider, model))
            .map(|entry| (entry.id().to_string(), entry.last_used_at()))
            .collect();

        if partition.len() <= keep {
            return Ok(0);
        }

        // Oldest first, evict until only `keep` remain
        partition.sort_by(|a, b| a.1.cmp(&b.1));

        let victims = partition.len() - keep;

        for (id, _) in partition.into_iter().take(victims) {
            entries.remove(&id);
        }

        Ok(victims)
    }

    async fn clear(&self) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(Self::write_error)?;

        let removed = entries.len();
        entries.clear();

        Ok(removed)
    }
}
