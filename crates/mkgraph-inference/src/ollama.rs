//! Ollama extraction backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mkgraph_core::{defaults, EntityExtractor, Error, ExtractionRequest, Result};

use crate::prompts::prompt_for;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_MODEL: &str = defaults::OLLAMA_MODEL;

/// Ollama extraction backend, talking to the local `/api/generate` API.
pub struct OllamaExtractor {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaExtractor {
    /// Create a backend against the default local endpoint, honoring the
    /// `OLLAMA_URL` environment variable.
    pub fn new() -> Self {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        Self::with_config(base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a backend with an explicit endpoint and model.
    pub fn with_config(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

impl Default for OllamaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityExtractor for OllamaExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        let prompt = prompt_for(request);
        let start = Instant::now();
        debug!(model = %self.model, prompt_len = prompt.len(), "ollama extraction call");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &prompt,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: GenerateResponse = response.json().await?;
        info!(
            model = %self.model,
            response_len = body.response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "ollama extraction complete"
        );
        Ok(body.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkgraph_core::SourceDocument;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn single_request() -> ExtractionRequest {
        ExtractionRequest::Single(SourceDocument::new("a.md", "Met with John."))
    }

    #[tokio::test]
    async fn test_extract_returns_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(
                serde_json::json!({"model": "llama3.2", "stream": false}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"response": "[{\"name\":\"John\",\"type\":\"person\"}]"}),
            ))
            .mount(&server)
            .await;

        let backend = OllamaExtractor::with_config(server.uri(), "llama3.2".to_string());
        let raw = backend.extract(&single_request()).await.unwrap();
        assert!(raw.contains("John"));
    }

    #[tokio::test]
    async fn test_http_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let backend = OllamaExtractor::with_config(server.uri(), "llama3.2".to_string());
        let err = backend.extract(&single_request()).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend =
            OllamaExtractor::with_config("http://localhost:11434/".to_string(), "m".to_string());
        assert_eq!(backend.base_url, "http://localhost:11434");
    }
}
