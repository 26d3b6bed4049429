//! Domain layer - Core business logic and entities

pub mod chunking;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod semantic_cache;

pub use chunking::{Chunk, ChunkingConfig, ChunkMetadata};
pub use embedding::{
    cosine_similarity, decode_embedding, encode_embedding, EmbeddingRequest, EmbeddingResponse,
    EmbeddingUsage, TextEmbedder,
};
pub use error::DomainError;
pub use llm::{
    classify_json_response, CallOutcome, ClientConfig, CompletionRequest, CompletionResponse,
    LlmClient, LlmProvider, ProviderKind, TokenUsage,
};
pub use semantic_cache::{CacheEntry, SemanticCacheConfig, SemanticCacheStore};
