//! API keys from environment variables

use std::collections::HashMap;
use std::env;

use crate::domain::llm::ProviderKind;
use crate::domain::DomainError;

/// Resolves per-provider API keys from the process environment.
///
/// The credential store itself (settings UI, keychain) belongs to the host
/// application; this side only reads whatever the host exported.
#[derive(Debug)]
pub struct EnvCredentialProvider {
    mappings: HashMap<ProviderKind, String>,
    lookup: fn(&str) -> Option<String>,
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            lookup: read_env,
        }
    }

    /// Standard variable names for every known provider
    pub fn with_defaults(mut self) -> Self {
        self.mappings
            .insert(ProviderKind::Gemini, "GEMINI_API_KEY".to_string());
        self.mappings
            .insert(ProviderKind::OpenAi, "OPENAI_API_KEY".to_string());
        self
    }

    /// Override the variable name for one provider
    pub fn with_mapping(mut self, kind: ProviderKind, env_var: impl Into<String>) -> Self {
        self.mappings.insert(kind, env_var.into());
        self
    }

    /// Replace how variables are read. The process environment is global
    /// mutable state, so tests inject a fixed table here instead of
    /// calling `set_var`.
    pub fn with_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Read the API key for a provider, failing when the mapping or the
    /// variable is missing
    pub fn api_key(&self, kind: ProviderKind) -> Result<String, DomainError> {
        let env_var = self.mappings.get(&kind).ok_or_else(|| {
            DomainError::configuration(format!(
                "No environment mapping configured for provider '{}'",
                kind
            ))
        })?;

        (self.lookup)(env_var).ok_or_else(|| {
            DomainError::configuration(format!(
                "Environment variable '{}' not set for provider '{}'",
                env_var, kind
            ))
        })
    }

    /// Whether a key is available for this provider right now
    pub fn supports(&self, kind: ProviderKind) -> bool {
        self.mappings
            .get(&kind)
            .is_some_and(|env_var| (self.lookup)(env_var).is_some())
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new().with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_key_lookup(name: &str) -> Option<String> {
        (name == "GEMINI_API_KEY").then(|| "gm-test-123".to_string())
    }

    #[test]
    fn test_reads_mapped_variable() {
        let provider = EnvCredentialProvider::new()
            .with_lookup(single_key_lookup)
            .with_mapping(ProviderKind::Gemini, "GEMINI_API_KEY");

        assert_eq!(provider.api_key(ProviderKind::Gemini).unwrap(), "gm-test-123");
        assert!(provider.supports(ProviderKind::Gemini));
    }

    #[test]
    fn test_missing_variable_is_configuration_error() {
        let provider = EnvCredentialProvider::new()
            .with_lookup(single_key_lookup)
            .with_mapping(ProviderKind::OpenAi, "OPENAI_API_KEY");

        let err = provider.api_key(ProviderKind::OpenAi).unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(!provider.supports(ProviderKind::OpenAi));
    }

    #[test]
    fn test_unmapped_provider_is_configuration_error() {
        let provider = EnvCredentialProvider::new();

        let result = provider.api_key(ProviderKind::Gemini);

        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_cover_every_kind() {
        let provider = EnvCredentialProvider::default();

        for kind in ProviderKind::all() {
            assert!(provider.mappings.contains_key(kind));
        }
    }
}
