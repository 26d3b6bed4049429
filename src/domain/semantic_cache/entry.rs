//! Semantic cache entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::llm::ProviderKind;
use crate::domain::DomainError;

/// A cached generative response, addressable by embedding similarity.
///
/// Entries live inside one `(provider, model)` partition and are never
/// matched across partitions. `last_used_at` is bumped on every hit and is
/// the sole eviction ordering key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unique identifier, `sem:<uuid>`
    id: String,
    /// Embedding of the query text, used for similarity search
    query_embedding: Vec<f32>,
    /// The original query text, kept for diagnosis only
    query_text: String,
    /// The cached response (JSON serialized)
    response: String,
    /// Backend that produced the response
    provider: ProviderKind,
    /// Model that produced the response
    model: String,
    /// When this entry was created
    created_at: DateTime<Utc>,
    /// When this entry last served a hit
    last_used_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create a fresh entry with a generated id and current timestamps
    pub fn new(
        query_embedding: Vec<f32>,
        query_text: impl Into<String>,
        response: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: format!("sem:{}", Uuid::new_v4()),
            query_embedding,
            query_text: query_text.into(),
            response: response.into(),
            provider,
            model: model.into(),
            created_at: now,
            last_used_at: now,
        }
    }

    /// Rehydrate an entry from stored fields
    #[allow(clippy::too_many_arguments)]
    pub fn from_row(
        id: impl Into<String>,
        query_embedding: Vec<f32>,
        query_text: impl Into<String>,
        response: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
        created_at: DateTime<Utc>,
        last_used_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            query_embedding,
            query_text: query_text.into(),
            response: response.into(),
            provider,
            model: model.into(),
            created_at,
            last_used_at,
        }
    }

    /// Get the entry ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the stored query embedding
    pub fn query_embedding(&self) -> &[f32] {
        &self.query_embedding
    }

    /// Get the original query text
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// Get the cached response text
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Get the backend this entry belongs to
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Get the model this entry belongs to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the last-hit timestamp
    pub fn last_used_at(&self) -> DateTime<Utc> {
        self.last_used_at
    }

    /// Record a hit at the given time
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_used_at = at;
    }

    /// Deserialize the cached response
    pub fn deserialize_response<T: for<'de> Deserialize<'de>>(&self) -> Result<T, DomainError> {
        serde_json::from_str(&self.response).map_err(|e| {
            DomainError::cache(format!("Failed to deserialize cached response: {}", e))
        })
    }
}
