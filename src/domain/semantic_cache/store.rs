//! Semantic cache storage trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::CacheEntry;
use crate::domain::llm::ProviderKind;
use crate::domain::DomainError;

/// Trait for semantic cache row storage.
///
/// Implementations own persistence and the per-partition LRU bookkeeping;
/// similarity scoring stays with the caller. All partition arguments refer
/// to the `(provider, model)` pair an entry was created under.
#[async_trait]
pub trait SemanticCacheStore: Send + Sync + Debug {
    /// Up to `limit` most-recently-used entries of a partition, most
    /// recently used first
    async fn recent(
        &self,
        provider: ProviderKind,
        model: &str,
        limit: usize,
    ) -> Result<Vec<CacheEntry>, DomainError>;

    /// Insert a new entry
    async fn insert(&self, entry: CacheEntry) -> Result<(), DomainError>;

    /// Bump an entry's last-used timestamp. Unknown ids are a no-op; the
    /// entry may have been evicted between lookup and bump.
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Number of entries in a partition
    async fn count(&self, provider: ProviderKind, model: &str) -> Result<usize, DomainError>;

    /// Evict least-recently-used entries of a partition until at most
    /// `keep` remain. Returns how many were evicted.
    async fn evict_down_to(
        &self,
        provider: ProviderKind,
        model: &str,
        keep: usize,
    ) -> Result<usize, DomainError>;

    /// Remove every entry across all partitions. Returns how many were
    /// removed.
    async fn clear(&self) -> Result<usize, DomainError>;
}
