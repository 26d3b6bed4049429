//! Semantic response cache service
//!
//! Memoizes generative calls by embedding proximity instead of exact key
//! match. Caching is pure optimization: every internal failure is logged
//! and degraded to a miss or no-op, never surfaced to the generation path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::embedding::{cosine_similarity, TextEmbedder};
use crate::domain::llm::ProviderKind;
use crate::domain::semantic_cache::{CacheEntry, SemanticCacheConfig, SemanticCacheStore};
use crate::domain::DomainError;

/// Counter snapshot for the cache
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 when nothing was looked up yet
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;

        if lookups == 0 {
            return 0.0;
        }

        self.hits as f64 / lookups as f64
    }
}

/// Approximate-match response cache over a store and an embedder.
///
/// Lookups scan the partition's most-recently-used rows only, bounding cost
/// regardless of partition size. The similarity threshold is an explicit
/// argument on every lookup so stricter callers can raise it per call.
#[derive(Debug)]
pub struct SemanticCacheService {
    store: Arc<dyn SemanticCacheStore>,
    embedder: Arc<dyn TextEmbedder>,
    config: SemanticCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
}

impl SemanticCacheService {
    pub fn new(store: Arc<dyn SemanticCacheStore>, embedder: Arc<dyn TextEmbedder>) -> Self {
        Self::with_config(store, embedder, SemanticCacheConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn SemanticCacheStore>,
        embedder: Arc<dyn TextEmbedder>,
        config: SemanticCacheConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Look up a response cached for a query similar to `query` within the
    /// `(provider, model)` partition.
    ///
    /// `None` is a valid, expected outcome, never an error: disabled cache,
    /// no close-enough entry, and every internal failure all look the same
    /// to the caller.
    pub async fn get(
        &self,
        query: &str,
        provider: ProviderKind,
        model: &str,
        threshold: f32,
    ) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }

        match self.try_get(query, provider, model, threshold).await {
            Ok(Some(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(error) => {
                warn!(%error, provider = %provider, model, "Cache lookup failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Cache `response` for `query` in the `(provider, model)` partition.
    ///
    /// Failures are logged and swallowed; a response that could not be
    /// cached is simply regenerated next time.
    pub async fn put(&self, query: &str, response: &Value, provider: ProviderKind, model: &str) {
        if !self.config.enabled {
            return;
        }

        match self.try_put(query, response, provider, model).await {
            Ok(()) => {
                self.stores.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                warn!(%error, provider = %provider, model, "Cache store failed, skipping");
            }
        }
    }

    /// Remove every cached entry. Returns how many were removed; a failing
    /// store is logged and counted as zero.
    pub async fn clear(&self) -> usize {
        match self.store.clear().await {
            Ok(removed) => removed,
            Err(error) => {
                warn!(%error, "Cache clear failed");
                0
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    async fn try_get(
        &self,
        query: &str,
        provider: ProviderKind,
        model: &str,
        threshold: f32,
    ) -> Result<Option<Value>, DomainError> {
        let query_embedding = self.embedder.embed_text(query).await?;

        let candidates = self
            .store
            .recent(provider, model, self.config.scan_limit)
            .await?;

        let best = candidates
            .iter()
            .map(|entry| {
                (
                    entry,
                    cosine_similarity(&query_embedding, entry.query_embedding()),
                )
            })
            .filter(|(_, similarity)| *similarity >= threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some((entry, similarity)) = best else {
            debug!(provider = %provider, model, "Semantic cache miss");
            return Ok(None);
        };

        debug!(
            provider = %provider,
            model,
            similarity,
            entry = entry.id(),
            "Semantic cache hit"
        );

        self.store.touch(entry.id(), Utc::now()).await?;

        entry.deserialize_response().map(Some)
    }

    async fn try_put(
        &self,
        query: &str,
        response: &Value,
        provider: ProviderKind,
        model: &str,
    ) -> Result<(), DomainError> {
        let query_embedding = self.embedder.embed_text(query).await?;

        // Batch eviction before insert; concurrent writers may transiently
        // overshoot the ceiling, the next write trims again
        let count = self.store.count(provider, model).await?;

        if count >= self.config.max_entries {
            let evicted = self
                .store
                .evict_down_to(provider, model, self.config.eviction_floor())
                .await?;

            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);

            debug!(provider = %provider, model, evicted, "Evicted least-recently-used entries");
        }

        let response_text = serde_json::to_string(response)
            .map_err(|e| DomainError::cache(format!("Failed to serialize response: {}", e)))?;

        let entry = CacheEntry::new(query_embedding, query, response_text, provider, model);

        self.store.insert(entry).await
    }
}
