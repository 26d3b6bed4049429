//! Embedding domain models and traits

mod embedder;
mod request;
mod response;
pub mod vector;

pub use embedder::TextEmbedder;
pub use request::EmbeddingRequest;
pub use response::{EmbeddingResponse, EmbeddingUsage};
pub use vector::{cosine_similarity, decode_embedding, encode_embedding};

#[cfg(test)]
pub use embedder::mock::StubEmbedder;
