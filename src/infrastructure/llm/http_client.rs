use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn request_error(e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::timeout("http", format!("Request timed out: {}", e))
        } else {
            DomainError::provider("http", format!("Request failed: {}", e))
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(Self::request_error)?;
        let response = Self::check_status(response).await?;

        response.json().await.map_err(|e| {
            DomainError::provider("http", format!("Failed to parse response: {}", e))
        })
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = self.client.get(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(Self::request_error)?;
        let response = Self::check_status(response).await?;

        response.json().await.map_err(|e| {
            DomainError::provider("http", format!("Failed to parse response: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_json_returns_response_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(header("x-api-key", "key-123"))
            .and(body_json(json!({"prompt": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hi"})))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let response = client
            .post_json(
                &format!("{}/v1/generate", server.uri()),
                vec![("x-api-key", "key-123")],
                &json!({"prompt": "hello"}),
            )
            .await
            .unwrap();

        assert_eq!(response["text"], "hi");
    }

    #[tokio::test]
    async fn test_get_json_returns_response_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let response = client
            .get_json(&format!("{}/v1/models", server.uri()), vec![])
            .await
            .unwrap();

        assert!(response["models"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("model gemini-0.5 not found"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let error = client
            .post_json(&server.uri(), vec![], &json!({}))
            .await
            .unwrap_err();

        match error {
            DomainError::ProviderRequest { message, .. } => {
                assert!(message.contains("404"));
                assert!(message.contains("not found"));
            }
            other => panic!("expected ProviderRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_response_maps_to_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(std::time::Duration::from_millis(20));
        let error = client
            .post_json(&server.uri(), vec![], &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(error, DomainError::Timeout { .. }));
    }
}
