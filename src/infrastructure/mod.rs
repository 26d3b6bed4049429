//! Infrastructure layer - External service implementations

pub mod chunking;
pub mod credentials;
pub mod llm;
pub mod logging;
pub mod semantic_cache;
pub mod services;
