//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to embed a single piece of text.
///
/// When `model` is `None` the provider uses its default embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model override
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    /// Text to embed
    input: String,
}

impl EmbeddingRequest {
    /// Create a request that uses the provider's default embedding model
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            model: None,
            input: input.into(),
        }
    }

    /// Pin the request to a specific embedding model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Get the pinned model, if any
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Get the input text
    pub fn input(&self) -> &str {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_provider_model() {
        let request = EmbeddingRequest::new("some text");

        assert_eq!(request.input(), "some text");
        assert!(request.model().is_none());
    }

    #[test]
    fn test_request_with_pinned_model() {
        let request = EmbeddingRequest::new("some text").with_model("text-embedding-004");

        assert_eq!(request.model(), Some("text-embedding-004"));
    }
}
