//! Semantic cache configuration

use serde::{Deserialize, Serialize};

/// Configuration for the semantic response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Whether semantic caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Hard ceiling on entries per (provider, model) partition
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// How many entries one eviction pass reclaims below the ceiling
    #[serde(default = "default_evict_batch")]
    pub evict_batch: usize,

    /// Most-recently-used rows examined per lookup
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,

    /// Similarity threshold used when the caller has no stricter preference
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,
}

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> usize {
    200
}

fn default_evict_batch() -> usize {
    20
}

fn default_scan_limit() -> usize {
    50
}

fn default_threshold() -> f32 {
    0.95
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            evict_batch: default_evict_batch(),
            scan_limit: default_scan_limit(),
            default_threshold: default_threshold(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition size an eviction pass trims down to
    pub fn eviction_floor(&self) -> usize {
        self.max_entries.saturating_sub(self.evict_batch.max(1))
    }

    /// Set whether caching is enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the per-partition entry ceiling
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    /// Set the eviction batch size
    pub fn with_evict_batch(mut self, batch: usize) -> Self {
        self.evict_batch = batch.max(1);
        self
    }

    /// Set the lookup scan bound
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit.max(1);
        self
    }

    /// Set the default similarity threshold
    pub fn with_default_threshold(mut self, threshold: f32) -> Self {
        self.default_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}
