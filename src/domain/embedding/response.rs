//! Embedding response types

use serde::{Deserialize, Serialize};

/// Usage statistics for an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    /// Number of prompt tokens
    prompt_tokens: u32,
    /// Total tokens used
    total_tokens: u32,
}

impl EmbeddingUsage {
    /// Create new usage stats
    pub fn new(prompt_tokens: u32, total_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            total_tokens,
        }
    }

    /// Get prompt tokens
    pub fn prompt_tokens(&self) -> u32 {
        self.prompt_tokens
    }

    /// Get total tokens
    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Response from an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Model that produced the vector
    model: String,
    /// The embedding vector
    vector: Vec<f32>,
    /// Usage statistics, when the provider reports them
    usage: Option<EmbeddingUsage>,
}

impl EmbeddingResponse {
    /// Create a new embedding response
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
            usage: None,
        }
    }

    /// Attach usage statistics
    pub fn with_usage(mut self, usage: EmbeddingUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Get the model that produced the vector
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// Get the vector dimensions
    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Get usage statistics
    pub fn usage(&self) -> Option<&EmbeddingUsage> {
        self.usage.as_ref()
    }

    /// Consume and return the vector
    pub fn into_vector(self) -> Vec<f32> {
        self.vector
    }
}
