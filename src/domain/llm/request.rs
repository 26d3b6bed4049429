use serde::{Deserialize, Serialize};

/// Parameters for a text completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model that should serve the completion
    pub model: String,
    /// User prompt
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Retarget the request at a different model, keeping everything else
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_construction() {
        let request = CompletionRequest::new("gemini-1.5-flash", "Summarize this note")
            .with_system_prompt("You are a concise writing assistant")
            .with_temperature(0.7)
            .with_max_tokens(256);

        assert_eq!(request.model, "gemini-1.5-flash");
        assert_eq!(request.prompt, "Summarize this note");
        assert_eq!(
            request.system_prompt.as_deref(),
            Some("You are a concise writing assistant")
        );
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(256));
    }

    #[test]
    fn test_retargeting_keeps_prompt() {
        let request = CompletionRequest::new("gemini-1.5-flash", "Hello")
            .with_temperature(0.2)
            .with_model("gemini-1.5-pro");

        assert_eq!(request.model, "gemini-1.5-pro");
        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.temperature, Some(0.2));
    }
}
