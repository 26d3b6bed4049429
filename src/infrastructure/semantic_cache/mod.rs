//! Semantic cache store implementations

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryCacheStore;
pub use sqlite::SqliteCacheStore;
