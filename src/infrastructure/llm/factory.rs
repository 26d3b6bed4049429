//! Static provider construction

use std::sync::Arc;

use super::http_client::HttpClient;
use super::{GeminiProvider, OpenAiProvider};
use crate::domain::llm::{LlmProvider, ProviderKind};

/// Factory for constructing LLM providers.
///
/// Every provider is built here, at startup, from a statically known kind.
/// Nothing inspects what happens to be importable at call time.
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider of the given kind over a fresh HTTP client
    pub fn create(kind: ProviderKind, api_key: impl Into<String>) -> Arc<dyn LlmProvider> {
        match kind {
            ProviderKind::Gemini => Self::create_gemini(api_key),
            ProviderKind::OpenAi => Self::create_openai(api_key),
        }
    }

    pub fn create_gemini(api_key: impl Into<String>) -> Arc<dyn LlmProvider> {
        Arc::new(GeminiProvider::new(HttpClient::new(), api_key))
    }

    pub fn create_gemini_with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Arc<dyn LlmProvider> {
        Arc::new(GeminiProvider::with_base_url(
            HttpClient::new(),
            api_key,
            base_url,
        ))
    }

    pub fn create_openai(api_key: impl Into<String>) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAiProvider::new(HttpClient::new(), api_key))
    }

    pub fn create_openai_with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAiProvider::with_base_url(
            HttpClient::new(),
            api_key,
            base_url,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini_provider() {
        let provider = LlmProviderFactory::create(ProviderKind::Gemini, "test-key");
        assert_eq!(provider.kind(), ProviderKind::Gemini);
        assert_eq!(provider.default_model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = LlmProviderFactory::create(ProviderKind::OpenAi, "test-key");
        assert_eq!(provider.kind(), ProviderKind::OpenAi);
        assert_eq!(provider.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_every_kind_is_constructible() {
        for kind in ProviderKind::all() {
            let provider = LlmProviderFactory::create(*kind, "test-key");
            assert_eq!(provider.kind(), *kind);
        }
    }
}
