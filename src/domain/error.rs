use thiserror::Error;

/// Maximum length of raw response text attached to an error for diagnosis
const MAX_CONTEXT_LEN: usize = 500;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Provider request error: {provider} - {message}")]
    ProviderRequest { provider: String, message: String },

    #[error("Timeout: {provider} - {message}")]
    Timeout { provider: String, message: String },

    #[error("JSON parse error after {attempts} attempts: {last_response}")]
    JsonParse { attempts: u32, last_response: String },

    #[error("Provider unavailable: {provider} - {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("Embedding error: {provider} - {message}")]
    Embedding { provider: String, message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Build a JSON parse error, truncating the raw response to a
    /// diagnosable size.
    pub fn json_parse(attempts: u32, last_response: impl Into<String>) -> Self {
        Self::JsonParse {
            attempts,
            last_response: truncate_context(last_response.into()),
        }
    }

    pub fn provider_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Embedding {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Whether this error is a bounded-deadline expiry, as opposed to a
    /// request that failed outright. Callers use this to pick between
    /// retry, fallback, and abort.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error is internal to the cache layer. Cache errors
    /// are caught at the service boundary and never reach callers.
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::Cache { .. })
    }

    /// Whether a request failed because the backend no longer serves the
    /// requested model. Providers react by retrying against their fallback
    /// chain instead of propagating.
    pub fn is_model_not_found(&self) -> bool {
        let Self::ProviderRequest { message, .. } = self else {
            return false;
        };

        let message = message.to_lowercase();

        message.contains("not found")
            || message.contains("not_found")
            || message.contains("does not exist")
            || message.contains("not supported")
    }
}

fn truncate_context(text: String) -> String {
    if text.len() <= MAX_CONTEXT_LEN {
        return text;
    }

    let mut end = MAX_CONTEXT_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &text[..end])
}
