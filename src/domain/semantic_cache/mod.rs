//! Semantic cache domain models and traits
//!
//! Provides vector-based response caching that matches semantically similar
//! queries rather than requiring exact key matches.

mod config;
mod entry;
mod store;

pub use config::SemanticCacheConfig;
pub use entry::CacheEntry;
pub use store::SemanticCacheStore;
