//! OpenAI provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::http_client::HttpClientTrait;
use crate::domain::embedding::{EmbeddingRequest, EmbeddingResponse, EmbeddingUsage};
use crate::domain::llm::{CompletionRequest, CompletionResponse, LlmProvider, ProviderKind, TokenUsage};
use crate::domain::DomainError;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Chat models this crate knows OpenAI serves, best first. OpenAI has no
/// usable listing endpoint for completion capability, so the fallback chain
/// comes from this static catalog.
const CHAT_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

/// OpenAI API provider.
///
/// Same fallback contract as Gemini: a model-not-found failure walks the
/// catalog in order instead of propagating.
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    embedding_model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, model: &str, request: &CompletionRequest) -> serde_json::Value {
        let mut messages: Vec<OpenAiMessage> = Vec::with_capacity(2);

        if let Some(ref system_prompt) = request.system_prompt {
            messages.push(OpenAiMessage {
                role: "system",
                content: system_prompt.clone(),
            });
        }

        messages.push(OpenAiMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<CompletionResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let mut completion =
            CompletionResponse::new(response.model, choice.message.content.unwrap_or_default());

        if let Some(usage) = response.usage {
            completion = completion
                .with_usage(TokenUsage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(completion)
    }

    async fn complete_with_model(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let first_error = match self.complete_with_model(&request.model, &request).await {
            Ok(response) => return Ok(response),
            Err(error) if error.is_model_not_found() => error,
            Err(error) => return Err(error),
        };

        warn!(
            model = %request.model,
            error = %first_error,
            "Requested OpenAI model unavailable, trying catalog"
        );

        let mut attempted = vec![request.model.clone()];

        for model in CHAT_MODELS {
            if attempted.iter().any(|tried| tried == model) {
                continue;
            }

            debug!(model, "Attempting fallback model");

            match self.complete_with_model(model, &request).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_model_not_found() => attempted.push(model.to_string()),
                Err(error) => return Err(error),
            }
        }

        Err(DomainError::provider_unavailable(
            "openai",
            format!("No available model, attempted: {}", attempted.join(", ")),
        ))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let model = request
            .model()
            .unwrap_or(self.embedding_model.as_str())
            .to_string();

        let body = serde_json::json!({
            "model": model,
            "input": request.input(),
        });

        let json = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::embedding("openai", e.to_string()))?;

        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default();

        if vector.is_empty() {
            return Err(DomainError::embedding(
                "openai",
                format!("Model '{}' returned an empty vector", model),
            ));
        }

        let mut embedding = EmbeddingResponse::new(response.model, vector);

        if let Some(usage) = response.usage {
            embedding =
                embedding.with_usage(EmbeddingUsage::new(usage.prompt_tokens, usage.total_tokens));
        }

        Ok(embedding)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    async fn available_models(&self) -> Result<Vec<String>, DomainError> {
        Ok(CHAT_MODELS.iter().map(|model| model.to_string()).collect())
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: String,
    data: Vec<OpenAiEmbeddingData>,
    usage: Option<OpenAiEmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}
