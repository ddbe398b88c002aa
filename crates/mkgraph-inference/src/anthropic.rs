//! Anthropic extraction backend (messages API).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mkgraph_core::{defaults, EntityExtractor, Error, ExtractionRequest, Result};

use crate::prompts::prompt_for;

/// Default Anthropic API endpoint.
pub const DEFAULT_ANTHROPIC_URL: &str = defaults::ANTHROPIC_URL;

/// Default generation model.
pub const DEFAULT_MODEL: &str = defaults::ANTHROPIC_MODEL;

/// Configuration for the Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key; `None` falls back to `ANTHROPIC_API_KEY` at call time.
    pub api_key: Option<String>,
    /// Model used for extraction.
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ANTHROPIC_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Anthropic extraction backend.
pub struct AnthropicExtractor {
    client: Client,
    config: AnthropicConfig,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

impl AnthropicExtractor {
    pub fn new(config: AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::EXTRACTION_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            config: AnthropicConfig {
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
        std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("ANTHROPIC_API_KEY not set".to_string()))
    }
}

#[async_trait]
impl EntityExtractor for AnthropicExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let prompt = prompt_for(request);
        let start = Instant::now();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "anthropic extraction call");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .json(&MessageRequest {
                model: &self.config.model,
                max_tokens: defaults::ANTHROPIC_MAX_TOKENS,
                messages: vec![Message {
                    role: "user",
                    content: &prompt,
                }],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "Anthropic returned {status}: {body}"
            )));
        }

        let body: MessageResponse = response.json().await?;
        let content = body
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();
        info!(
            model = %self.config.model,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "anthropic extraction complete"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
