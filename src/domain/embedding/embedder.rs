use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for turning text into an embedding vector.
///
/// The semantic cache depends on this narrow seam instead of a full LLM
/// provider, so lookups can be driven with deterministic vectors in tests.
#[async_trait]
pub trait TextEmbedder: Send + Sync + Debug {
    /// Embed a single piece of text
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError>;
}
