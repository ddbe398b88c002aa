//! Provider selection and extractor construction.

use std::str::FromStr;

use tracing::info;

use mkgraph_core::{defaults, EntityExtractor, Error, LlmConfig, Result};

use crate::anthropic::{AnthropicConfig, AnthropicExtractor};
use crate::ollama::OllamaExtractor;
use crate::openai::{OpenAIConfig, OpenAIExtractor};

/// Known LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("unknown LLM provider: {other}"))),
        }
    }
}

/// Build the extraction backend described by an [`LlmConfig`].
pub fn build_extractor(config: &LlmConfig) -> Result<Box<dyn EntityExtractor>> {
    let provider = Provider::from_str(&config.provider)?;
    info!(provider = %provider, model = ?config.model, "building extraction backend");

    let extractor: Box<dyn EntityExtractor> = match provider {
        Provider::OpenAI => Box::new(OpenAIExtractor::new(OpenAIConfig {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::OPENAI_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| defaults::OPENAI_MODEL.to_string()),
            temperature: config.temperature,
        })),
        Provider::Anthropic => Box::new(AnthropicExtractor::new(AnthropicConfig {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| defaults::ANTHROPIC_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| defaults::ANTHROPIC_MODEL.to_string()),
        })),
        Provider::Ollama => {
            let base_url = config.base_url.clone().unwrap_or_else(|| {
                std::env::var("OLLAMA_URL").unwrap_or_else(|_| defaults::OLLAMA_URL.to_string())
            });
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| defaults::OLLAMA_MODEL.to_string());
            Box::new(OllamaExtractor::with_config(base_url, model))
        }
    };
    Ok(extractor)
}
