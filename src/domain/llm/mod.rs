//! LLM domain models and traits

mod client;
mod kind;
mod outcome;
mod provider;
mod request;
mod response;

pub use client::{ClientConfig, LlmClient, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TEMPERATURE};
pub use kind::ProviderKind;
pub use outcome::{classify_json_response, CallOutcome};
pub use provider::LlmProvider;
pub use request::CompletionRequest;
pub use response::{CompletionResponse, TokenUsage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
