//! Google Gemini provider with remote model discovery and fallback

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::http_client::HttpClientTrait;
use crate::domain::embedding::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::llm::{CompletionRequest, CompletionResponse, LlmProvider, ProviderKind, TokenUsage};
use crate::domain::DomainError;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Models to fall back on when the discovery endpoint itself is down
const LAST_KNOWN_GOOD_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-1.5-flash-8b",
];

/// Gemini API provider.
///
/// Upstream retires model ids without notice; when a completion fails with a
/// model-not-found signature, the provider discovers the currently served
/// models and retries the same request against each untried one in order.
/// Discovery is cached for the lifetime of this instance.
#[derive(Debug)]
pub struct GeminiProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    embedding_model: String,
    discovered_models: RwLock<Option<Vec<String>>>,
}

impl<C: HttpClientTrait> GeminiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            discovered_models: RwLock::new(None),
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn embed_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:embedContent", self.base_url, model)
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
        });

        if let Some(ref system_prompt) = request.system_prompt {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_prompt }],
            });
        }

        let mut generation_config = serde_json::Map::new();

        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(temperature));
        }

        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(max_tokens));
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<CompletionResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("gemini", "No candidates in response"))?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        let mut completion = CompletionResponse::new(model, content);

        if let Some(usage) = response.usage_metadata {
            completion = completion.with_usage(TokenUsage::new(
                usage.prompt_token_count,
                usage.candidates_token_count.unwrap_or(0),
            ));
        }

        Ok(completion)
    }

    async fn complete_with_model(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.generate_url(model);
        let body = self.build_request(request);

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(model, response)
    }

    /// Resolve the ordered model list to try when the configured model is
    /// gone. Cached per instance; the remote listing runs at most once, and
    /// a failed listing pins the hardcoded last-known-good set instead.
    async fn fallback_models(&self) -> Vec<String> {
        if let Some(ref models) = *self.discovered_models.read().await {
            return models.clone();
        }

        let mut cached = self.discovered_models.write().await;

        // Another caller may have raced us to the discovery
        if let Some(ref models) = *cached {
            return models.clone();
        }

        let models = match self.discover_models().await {
            Ok(models) if !models.is_empty() => {
                debug!(count = models.len(), "Discovered Gemini models");
                models
            }
            Ok(_) => {
                warn!("Gemini model listing came back empty, using last known good models");
                last_known_good()
            }
            Err(error) => {
                warn!(%error, "Gemini model listing failed, using last known good models");
                last_known_good()
            }
        };

        *cached = Some(models.clone());

        models
    }

    async fn discover_models(&self) -> Result<Vec<String>, DomainError> {
        let json = self
            .client
            .get_json(&self.models_url(), self.headers())
            .await?;

        let listing: GeminiModelListing = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse model listing: {}", e))
        })?;

        Ok(listing
            .models
            .into_iter()
            .filter(|model| {
                model
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|model| {
                model
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&model.name)
                    .to_string()
            })
            .collect())
    }
}

fn last_known_good() -> Vec<String> {
    LAST_KNOWN_GOOD_MODELS
        .iter()
        .map(|model| model.to_string())
        .collect()
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for GeminiProvider<C> {
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
            "Requested Gemini model unavailable, trying fallback chain"
        );

        let mut attempted = vec![request.model.clone()];

        for model in self.fallback_models().await {
            if attempted.contains(&model) {
                continue;
            }

            debug!(model = %model, "Attempting fallback model");

            match self.complete_with_model(&model, &request).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_model_not_found() => attempted.push(model),
                Err(error) => return Err(error),
            }
        }

        Err(DomainError::provider_unavailable(
            "gemini",
            format!("No available model, attempted: {}", attempted.join(", ")),
        ))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let model = request
            .model()
            .unwrap_or(self.embedding_model.as_str())
            .to_string();
        let url = self.embed_url(&model);

        let body = serde_json::json!({
            "content": {
                "parts": [{ "text": request.input() }],
            },
        });

        let json = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::embedding("gemini", e.to_string()))?;

        let response: GeminiEmbedResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding("gemini", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.embedding.values.is_empty() {
            return Err(DomainError::embedding(
                "gemini",
                format!("Model '{}' returned an empty vector", model),
            ));
        }

        Ok(EmbeddingResponse::new(model, response.embedding.values))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    async fn available_models(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.fallback_models().await)
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelListing {
    #[serde(default)]
    models: Vec<GeminiModelEntry>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelEntry {
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}
