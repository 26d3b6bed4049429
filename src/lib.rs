//! Lorebase LLM orchestration core
//!
//! The generative layer of the Lorebase knowledge assistant:
//! - Interchangeable LLM backends behind one client facade, with
//!   model-fallback and JSON-repair retry logic
//! - A semantic response cache that memoizes generative calls by
//!   embedding similarity, partitioned per (provider, model), with
//!   LRU eviction

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use domain::embedding::TextEmbedder;
use domain::llm::{ClientConfig, LlmClient, LlmProvider, ProviderKind};
pub use infrastructure::logging::init_logging;
use infrastructure::credentials::EnvCredentialProvider;
use infrastructure::llm::LlmProviderFactory;
use infrastructure::semantic_cache::{InMemoryCacheStore, SqliteCacheStore};
use infrastructure::services::SemanticCacheService;

/// Build the LLM client from configuration and environment credentials.
///
/// Every provider whose API key resolves gets registered; when the
/// configured default provider has no key, the first one that does takes
/// its place. No key at all is a startup failure.
pub fn create_client(config: &AppConfig) -> anyhow::Result<Arc<LlmClient>> {
    create_client_with_credentials(config, &EnvCredentialProvider::default())
}

pub fn create_client_with_credentials(
    config: &AppConfig,
    credentials: &EnvCredentialProvider,
) -> anyhow::Result<Arc<LlmClient>> {
    let mut providers: HashMap<ProviderKind, Arc<dyn LlmProvider>> = HashMap::new();

    for kind in ProviderKind::all() {
        match credentials.api_key(*kind) {
            Ok(api_key) => {
                providers.insert(*kind, LlmProviderFactory::create(*kind, api_key));
                info!(provider = %kind, "Registered LLM provider");
            }
            Err(error) => {
                warn!(provider = %kind, %error, "Skipping provider without credentials");
            }
        }
    }

    let active = if providers.contains_key(&config.llm.provider) {
        config.llm.provider
    } else {
        let substitute = providers
            .keys()
            .next()
            .copied()
            .context("No LLM provider has credentials configured")?;

        warn!(
            configured = %config.llm.provider,
            substitute = %substitute,
            "Configured provider has no credentials, substituting"
        );

        substitute
    };

    let model = match config.llm.model {
        Some(ref model) => model.clone(),
        None => providers[&active].default_model().to_string(),
    };

    let client_config =
        ClientConfig::new(active, model).with_temperature(config.llm.temperature);

    let client = LlmClient::new(providers, client_config)?
        .with_request_timeout(Duration::from_millis(config.llm.request_timeout_ms));

    Ok(Arc::new(client))
}

/// Build the semantic cache over the configured store.
///
/// A `cache.database_url` selects the SQLite store; without one the cache
/// lives in memory and empties on restart. The embedder is typically the
/// `LlmClient` built above.
pub async fn create_semantic_cache(
    config: &AppConfig,
    embedder: Arc<dyn TextEmbedder>,
) -> anyhow::Result<Arc<SemanticCacheService>> {
    let service = match config.cache.database_url {
        Some(ref url) => {
            let store = SqliteCacheStore::connect(url)
                .await
                .with_context(|| format!("Failed to open semantic cache at '{}'", url))?;

            info!(url, "Semantic cache persisted in SQLite");

            SemanticCacheService::with_config(
                Arc::new(store),
                embedder,
                config.cache.semantic.clone(),
            )
        }
        None => {
            info!("Semantic cache kept in memory");

            SemanticCacheService::with_config(
                Arc::new(InMemoryCacheStore::new()),
                embedder,
                config.cache.semantic.clone(),
            )
        }
    };

    Ok(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_key_only(name: &str) -> Option<String> {
        (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
    }

    #[test]
    fn test_create_client_without_any_credentials_fails() {
        let credentials = EnvCredentialProvider::new()
            .with_lookup(|_| None)
            .with_mapping(ProviderKind::Gemini, "GEMINI_API_KEY")
            .with_mapping(ProviderKind::OpenAi, "OPENAI_API_KEY");

        let result = create_client_with_credentials(&AppConfig::default(), &credentials);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_client_substitutes_available_provider() {
        let credentials = EnvCredentialProvider::new()
            .with_lookup(openai_key_only)
            .with_mapping(ProviderKind::Gemini, "GEMINI_API_KEY")
            .with_mapping(ProviderKind::OpenAi, "OPENAI_API_KEY");

        // Default config asks for Gemini, which has no key here
        let client = create_client_with_credentials(&AppConfig::default(), &credentials).unwrap();

        assert_eq!(client.provider().await, ProviderKind::OpenAi);
    }

    #[tokio::test]
    async fn test_create_semantic_cache_defaults_to_memory() {
        let embedder: Arc<dyn TextEmbedder> = Arc::new(domain::embedding::StubEmbedder::new());

        let cache = create_semantic_cache(&AppConfig::default(), embedder)
            .await
            .unwrap();

        assert!(cache.is_enabled());
    }

    #[tokio::test]
    async fn test_create_semantic_cache_with_sqlite_url() {
        let embedder: Arc<dyn TextEmbedder> = Arc::new(domain::embedding::StubEmbedder::new());
        let mut config = AppConfig::default();
        config.cache.database_url = Some("sqlite::memory:".to_string());

        let cache = create_semantic_cache(&config, embedder).await.unwrap();

        assert!(cache.is_enabled());
    }
}
