//! Client facade - routes completions, JSON calls, and embeddings to the active provider

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::outcome::{classify_json_response, CallOutcome};
use super::{CompletionRequest, LlmProvider, ProviderKind};
use crate::domain::embedding::{EmbeddingRequest, TextEmbedder};
use crate::domain::DomainError;

/// Default bound on any single provider round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Instruction appended to JSON-constrained completions
const JSON_SYSTEM_HINT: &str = "Respond with a single valid JSON object and nothing else.";

/// Mutable request routing state owned by one client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend serving new requests
    pub provider: ProviderKind,
    /// Model requested from that backend
    pub model: String,
    /// Sampling temperature for completions
    pub temperature: f32,
}

impl ClientConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Facade over the registered LLM backends.
///
/// Holds one provider instance per backend and a mutable `(provider, model,
/// temperature)` tuple that every request reads at issue time. Each instance
/// owns its configuration; two clients never share routing state.
#[derive(Debug)]
pub struct LlmClient {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
    config: RwLock<ClientConfig>,
    request_timeout: Duration,
}

impl LlmClient {
    /// Create a client over the given providers.
    ///
    /// Fails when no providers are registered or the initial configuration
    /// points at a backend that is not in the map.
    pub fn new(
        providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
        config: ClientConfig,
    ) -> Result<Self, DomainError> {
        if providers.is_empty() {
            return Err(DomainError::configuration(
                "At least one provider is required",
            ));
        }

        if !providers.contains_key(&config.provider) {
            return Err(DomainError::configuration(format!(
                "Provider '{}' is not registered",
                config.provider
            )));
        }

        Ok(Self {
            providers,
            config: RwLock::new(config),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Generate a text completion with the active provider and model
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<String, DomainError> {
        let (provider, request) = self
            .prepare_request(prompt, system_prompt, max_tokens)
            .await?;

        debug!(provider = %provider.kind(), model = %request.model, "Issuing completion");

        let response = self
            .bounded(provider.kind(), provider.complete(request))
            .await?;

        Ok(response.content)
    }

    /// Generate a completion that must parse to a JSON object.
    ///
    /// Non-object or unparseable output is retried up to `max_retries` total
    /// attempts; at least one attempt is always made. Provider failures are
    /// terminal and propagate on the spot. Exhausting the attempts fails with
    /// a `JsonParse` error carrying the last raw response for diagnosis.
    pub async fn complete_json(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_retries: u32,
    ) -> Result<Value, DomainError> {
        let max_attempts = max_retries.max(1);
        let mut last_raw = String::new();

        for attempt in 1..=max_attempts {
            let (provider, request) = self.prepare_json_request(prompt, system_prompt).await?;
            let kind = provider.kind();

            debug!(provider = %kind, model = %request.model, attempt, "Issuing JSON completion");

            let outcome = match self.bounded(kind, provider.complete(request)).await {
                Ok(response) => {
                    let outcome = classify_json_response(&response.content);
                    if outcome.is_retryable() {
                        last_raw = response.content;
                    }
                    outcome
                }
                Err(error) => CallOutcome::FatalFailure(error),
            };

            match outcome {
                CallOutcome::Success(value) => {
                    if attempt > 1 {
                        debug!(attempt, "JSON completion recovered after retry");
                    }
                    return Ok(value);
                }
                CallOutcome::RetryableFailure(reason) => {
                    warn!(attempt, max_attempts, %reason, "JSON completion attempt rejected");
                }
                CallOutcome::FatalFailure(error) => return Err(error),
            }
        }

        Err(DomainError::json_parse(max_attempts, last_raw))
    }

    /// Embed a single piece of text with the active provider
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let config = self.config.read().await.clone();
        let provider = self.provider_for(config.provider)?;

        let response = self
            .bounded(config.provider, provider.embed(EmbeddingRequest::new(text)))
            .await?;

        Ok(response.into_vector())
    }

    pub async fn provider(&self) -> ProviderKind {
        self.config.read().await.provider
    }

    /// Switch the active backend.
    ///
    /// The model is left untouched; if the new backend does not serve it,
    /// the provider's fallback substitutes an available one on first use.
    pub async fn set_provider(&self, kind: ProviderKind) -> Result<(), DomainError> {
        if !self.providers.contains_key(&kind) {
            return Err(DomainError::configuration(format!(
                "Provider '{}' is not registered",
                kind
            )));
        }

        let mut config = self.config.write().await;
        config.provider = kind;

        info!(provider = %kind, "Switched active provider");

        Ok(())
    }

    pub async fn model(&self) -> String {
        self.config.read().await.model.clone()
    }

    pub async fn set_model(&self, model: impl Into<String>) {
        let mut config = self.config.write().await;
        config.model = model.into();
    }

    pub async fn temperature(&self) -> f32 {
        self.config.read().await.temperature
    }

    /// Set the sampling temperature, clamped to `0.0..=2.0`
    pub async fn set_temperature(&self, temperature: f32) {
        let mut config = self.config.write().await;
        config.temperature = temperature.clamp(0.0, 2.0);
    }

    async fn prepare_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<(Arc<dyn LlmProvider>, CompletionRequest), DomainError> {
        let config = self.config.read().await.clone();
        let provider = self.provider_for(config.provider)?;

        let mut request =
            CompletionRequest::new(config.model, prompt).with_temperature(config.temperature);

        if let Some(system_prompt) = system_prompt {
            request = request.with_system_prompt(system_prompt);
        }

        if let Some(max_tokens) = max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        Ok((provider, request))
    }

    async fn prepare_json_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<(Arc<dyn LlmProvider>, CompletionRequest), DomainError> {
        let hint = match system_prompt {
            Some(system_prompt) => format!("{}\n\n{}", system_prompt, JSON_SYSTEM_HINT),
            None => JSON_SYSTEM_HINT.to_string(),
        };

        let (provider, request) = self.prepare_request(prompt, None, None).await?;

        Ok((provider, request.with_system_prompt(hint)))
    }

    fn provider_for(&self, kind: ProviderKind) -> Result<Arc<dyn LlmProvider>, DomainError> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            DomainError::configuration(format!("Provider '{}' is not registered", kind))
        })
    }

    /// Run a provider call under the client-wide timeout
    async fn bounded<T>(
        &self,
        provider: ProviderKind,
        future: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match timeout(self.request_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(
                provider.as_str(),
                format!(
                    "Request timed out after {}ms",
                    self.request_timeout.as_millis()
                ),
            )),
        }
    }
}

#[async_trait]
impl TextEmbedder for LlmClient {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        self.embed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;

    fn client_with(
        kind: ProviderKind,
        provider: Arc<MockLlmProvider>,
    ) -> LlmClient {
        let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();
        providers.insert(kind, provider);

        LlmClient::new(providers, ClientConfig::new(kind, "mock-model")).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_content() {
        let mock = Arc::new(MockLlmProvider::new(ProviderKind::Gemini).with_completion("Hello!"));
        let client = client_with(ProviderKind::Gemini, mock.clone());

        let content = client.complete("Hi", None, None).await.unwrap();

        assert_eq!(content, "Hello!");
        assert_eq!(mock.requested_models(), vec!["mock-model".to_string()]);
    }

    #[tokio::test]
    async fn test_complete_json_recovers_on_later_attempt() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini)
                .with_completion("not json")
                .with_completion("still not json")
                .with_completion(r#"{"status": "ok"}"#),
        );
        let client = client_with(ProviderKind::Gemini, mock.clone());

        let value = client.complete_json("Give me JSON", None, 3).await.unwrap();

        assert_eq!(value["status"], "ok");
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_complete_json_exhausts_retries() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini)
                .with_completion("garbage one")
                .with_completion("garbage two")
                .with_completion("garbage three"),
        );
        let client = client_with(ProviderKind::Gemini, mock.clone());

        let result = client.complete_json("Give me JSON", None, 3).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
        assert!(err.to_string().contains("garbage three"));
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_stops_json_retries() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini)
                .with_completion_error(DomainError::provider("gemini", "connection refused")),
        );
        let client = client_with(ProviderKind::Gemini, mock.clone());

        let result = client.complete_json("Give me JSON", None, 5).await;

        assert!(result.is_err());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_switching_provider_routes_requests() {
        let gemini =
            Arc::new(MockLlmProvider::new(ProviderKind::Gemini).with_completion("from gemini"));
        let openai =
            Arc::new(MockLlmProvider::new(ProviderKind::OpenAi).with_completion("from openai"));

        let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();
        providers.insert(ProviderKind::Gemini, gemini.clone());
        providers.insert(ProviderKind::OpenAi, openai.clone());

        let client = LlmClient::new(
            providers,
            ClientConfig::new(ProviderKind::Gemini, "mock-model"),
        )
        .unwrap();

        assert_eq!(client.complete("Hi", None, None).await.unwrap(), "from gemini");

        client.set_provider(ProviderKind::OpenAi).await.unwrap();

        assert_eq!(client.complete("Hi", None, None).await.unwrap(), "from openai");
        assert_eq!(gemini.calls(), 1);
        assert_eq!(openai.calls(), 1);
    }

    #[tokio::test]
    async fn test_set_provider_rejects_unregistered_backend() {
        let mock = Arc::new(MockLlmProvider::new(ProviderKind::Gemini));
        let client = client_with(ProviderKind::Gemini, mock);

        let result = client.set_provider(ProviderKind::OpenAi).await;

        assert!(result.is_err());
        assert_eq!(client.provider().await, ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn test_set_temperature_clamps_range() {
        let mock = Arc::new(MockLlmProvider::new(ProviderKind::Gemini));
        let client = client_with(ProviderKind::Gemini, mock);

        client.set_temperature(9.5).await;
        assert_eq!(client.temperature().await, 2.0);

        client.set_temperature(-1.0).await;
        assert_eq!(client.temperature().await, 0.0);
    }

    #[tokio::test]
    async fn test_set_model_applies_to_next_request() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini)
                .with_completion("first")
                .with_completion("second"),
        );
        let client = client_with(ProviderKind::Gemini, mock.clone());

        client.complete("Hi", None, None).await.unwrap();
        client.set_model("mock-model-pro").await;
        client.complete("Hi", None, None).await.unwrap();

        assert_eq!(
            mock.requested_models(),
            vec!["mock-model".to_string(), "mock-model-pro".to_string()]
        );
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_timeout_error() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini)
                .with_completion("too late")
                .with_latency(Duration::from_millis(200)),
        );
        let client =
            client_with(ProviderKind::Gemini, mock).with_request_timeout(Duration::from_millis(20));

        let result = client.complete("Hi", None, None).await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_embed_returns_provider_vector() {
        let mock = Arc::new(
            MockLlmProvider::new(ProviderKind::Gemini).with_embedding(vec![0.25, 0.5, 0.25]),
        );
        let client = client_with(ProviderKind::Gemini, mock);

        let vector = client.embed("some text").await.unwrap();

        assert_eq!(vector, vec![0.25, 0.5, 0.25]);
    }

    #[tokio::test]
    async fn test_client_requires_registered_initial_provider() {
        let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();
        providers.insert(
            ProviderKind::Gemini,
            Arc::new(MockLlmProvider::new(ProviderKind::Gemini)) as Arc<dyn LlmProvider>,
        );

        let result = LlmClient::new(
            providers,
            ClientConfig::new(ProviderKind::OpenAi, "gpt-4o-mini"),
        );

        assert!(result.is_err());
        assert!(LlmClient::new(
            HashMap::new(),
            ClientConfig::new(ProviderKind::Gemini, "m")
        )
        .is_err());
    }
}
