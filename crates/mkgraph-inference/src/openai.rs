//! OpenAI-compatible extraction backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mkgraph_core::{defaults, EntityExtractor, Error, ExtractionRequest, Result};

use crate::prompts::prompt_for;

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// Default generation model.
pub const DEFAULT_MODEL: &str = defaults::OPENAI_MODEL;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key; `None` falls back to `OPENAI_API_KEY` at call time.
    pub api_key: Option<String>,
    /// Model used for extraction.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
        }
    }
}

/// OpenAI-compatible extraction backend (chat completions API).
pub struct OpenAIExtractor {
    client: Client,
    config: OpenAIConfig,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl OpenAIExtractor {
    pub fn new(config: OpenAIConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            config: OpenAIConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        }
    }

    fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.config.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".to_string()))
    }
}

#[async_trait]
impl EntityExtractor for OpenAIExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let prompt = prompt_for(request);
        let start = Instant::now();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "openai extraction call");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: &self.config.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: &prompt,
                }],
                temperature: self.config.temperature,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        info!(
            model = %self.config.model,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "openai extraction complete"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkgraph_core::SourceDocument;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn single_request() -> ExtractionRequest {
        ExtractionRequest::Single(SourceDocument::new("a.md", "Met with John."))
    }

    fn config(server: &MockServer) -> OpenAIConfig {
        OpenAIConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_extract_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "[]"}}]
            })))
            .mount(&server)
            .await;

        let backend = OpenAIExtractor::new(config(&server));
        assert_eq!(backend.extract(&single_request()).await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let server = MockServer::start().await;
        let backend = OpenAIExtractor::new(OpenAIConfig {
            base_url: server.uri(),
            api_key: Some(String::new()),
            ..Default::default()
        });

        // Empty configured key and no env fallback in this test process
        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = backend.extract(&single_request()).await.unwrap_err();
            assert!(matches!(err, Error::Config(_)));
        }
    }

    #[tokio::test]
    async fn test_http_error_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let backend = OpenAIExtractor::new(config(&server));
        let err = backend.extract(&single_request()).await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
