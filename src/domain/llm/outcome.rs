//! Attempt classification for JSON-constrained completions

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::DomainError;

/// Regex to strip a markdown code fence: ```json ... ``` or ``` ... ```
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// How a single attempt of a retried call went
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// The attempt produced a usable value
    Success(T),
    /// The attempt failed in a way another try can fix
    RetryableFailure(String),
    /// The attempt failed terminally; retrying cannot help
    FatalFailure(DomainError),
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CallOutcome::RetryableFailure(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, CallOutcome::FatalFailure(_))
    }
}

/// Classify the raw text of a completion that was asked for a JSON object.
///
/// A markdown fence around the payload is stripped before parsing. Anything
/// that does not parse to a JSON object is retryable; models are
/// non-deterministic, so a second attempt has real odds of succeeding.
pub fn classify_json_response(raw: &str) -> CallOutcome<Value> {
    let candidate = JSON_FENCE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim();

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => CallOutcome::Success(value),
        Ok(value) => CallOutcome::RetryableFailure(format!(
            "Expected a JSON object, got {}",
            json_type_name(&value)
        )),
        Err(e) => CallOutcome::RetryableFailure(format!("Invalid JSON: {}", e)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_succeeds() {
        let outcome = classify_json_response(r#"{"title": "Note", "tags": ["a"]}"#);

        match outcome {
            CallOutcome::Success(value) => assert_eq!(value["title"], "Note"),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_fenced_object_succeeds() {
        let raw = "Here you go:\n```json\n{\"summary\": \"short\"}\n```\nLet me know!";

        let outcome = classify_json_response(raw);

        match outcome {
            CallOutcome::Success(value) => assert_eq!(value["summary"], "short"),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"ok\": true}\n```";

        assert!(classify_json_response(raw).is_success());
    }

    #[test]
    fn test_array_is_retryable() {
        let outcome = classify_json_response(r#"[1, 2, 3]"#);

        match outcome {
            CallOutcome::RetryableFailure(reason) => assert!(reason.contains("array")),
            other => panic!("expected retryable, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_is_retryable() {
        assert!(classify_json_response("42").is_retryable());
        assert!(classify_json_response("\"just a string\"").is_retryable());
    }

    #[test]
    fn test_prose_is_retryable() {
        let outcome = classify_json_response("I'm sorry, I can't produce JSON for that.");

        assert!(outcome.is_retryable());
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        assert!(classify_json_response("  \n {\"a\": 1} \n ").is_success());
    }
}
