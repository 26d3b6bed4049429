use serde::Deserialize;

use crate::domain::llm::ProviderKind;
use crate::domain::semantic_cache::SemanticCacheConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for the mutable (provider, model, temperature) tuple.
///
/// The host's settings surface mutates the live values through the client's
/// setters; these are only what a fresh process starts from.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    /// Model to start with; `None` means the provider's default
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Bound on any single provider round trip
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Semantic cache settings plus where to persist it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// SQLite url, e.g. `sqlite://lorebase-cache.db`; `None` keeps the
    /// cache in memory only
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(flatten)]
    pub semantic: SemanticCacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            temperature: default_temperature(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Layer `config/default`, `config/local`, and `LOREBASE`-prefixed
    /// environment variables, in that order
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LOREBASE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.llm.provider, ProviderKind::Gemini);
        assert!(config.llm.model.is_none());
        assert_eq!(config.llm.request_timeout_ms, 30_000);
        assert!(config.cache.database_url.is_none());
        assert!(config.cache.semantic.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_deserializes_with_flattened_cache_settings() {
        let raw = json!({
            "llm": {
                "provider": "openai",
                "model": "gpt-4o",
                "temperature": 0.2
            },
            "cache": {
                "database_url": "sqlite://cache.db",
                "max_entries": 500,
                "default_threshold": 0.9
            },
            "logging": {
                "level": "debug",
                "format": "json"
            }
        });

        let config: AppConfig = serde_json::from_value(raw).unwrap();

        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.llm.request_timeout_ms, 30_000);
        assert_eq!(config.cache.database_url.as_deref(), Some("sqlite://cache.db"));
        assert_eq!(config.cache.semantic.max_entries, 500);
        assert!((config.cache.semantic.default_threshold - 0.9).abs() < 0.01);
        assert!(matches!(config.logging.format, LogFormat::Json));
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_json::from_value(json!({
            "llm": { "provider": "gemini" }
        }))
        .unwrap();

        assert!((config.llm.temperature - 0.7).abs() < 0.01);
        assert!(config.cache.semantic.enabled);
    }
}
