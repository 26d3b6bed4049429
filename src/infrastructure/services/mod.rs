//! Service layer orchestrating domain traits over concrete stores

mod semantic_cache_service;

pub use semantic_cache_service::{CacheStats, SemanticCacheService};
