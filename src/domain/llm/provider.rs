use async_trait::async_trait;
use std::fmt::Debug;

use super::{CompletionRequest, CompletionResponse, ProviderKind};
use crate::domain::embedding::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for LLM backends (Gemini, OpenAI, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Generate a text completion.
    ///
    /// Implementations substitute another available model when the requested
    /// one is gone, so callers see either a completion or an exhausted
    /// `ProviderUnavailable` error, not a raw model-not-found failure.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, DomainError>;

    /// Embed a single piece of text
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Which backend this is
    fn kind(&self) -> ProviderKind;

    /// Model used when the caller does not pick one
    fn default_model(&self) -> &'static str;

    /// List models currently served by this backend
    async fn available_models(&self) -> Result<Vec<String>, DomainError>;
}
