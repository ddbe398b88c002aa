//! # mkgraph-inference
//!
//! Extraction collaborators for mkgraph: prompt templates and the HTTP
//! backends (OpenAI, Anthropic, Ollama) implementing the core's
//! [`EntityExtractor`](mkgraph_core::EntityExtractor) boundary, plus a
//! deterministic mock for tests.

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod provider;

pub use anthropic::AnthropicExtractor;
pub use mock::MockExtractor;
pub use ollama::OllamaExtractor;
pub use openai::OpenAIExtractor;
pub use provider::{build_extractor, Provider};
