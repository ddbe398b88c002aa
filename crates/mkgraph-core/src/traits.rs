//! Collaborator boundary traits.

use async_trait::async_trait;

use crate::error::Result;

/// One input document handed to an extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Source identifier (the input file path).
    pub source: String,
    /// Full text content.
    pub content: String,
}

impl SourceDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// Payload for one extraction call: either a single document or a batch
/// whose items the model attributes individually via a `source` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRequest {
    Single(SourceDocument),
    Batch(Vec<SourceDocument>),
}

/// Entity extraction collaborator.
///
/// A pure text-in/text-out boundary: the core hands over already-read file
/// content and receives unstructured model output back. All parsing of
/// that output belongs to the core; the implementation's provider identity
/// is opaque here.
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Run one extraction call and return the raw model output.
    async fn extract(&self, request: &ExtractionRequest) -> Result<String>;

    /// Model slug used for extraction calls, for logging.
    fn model_name(&self) -> &str;
}
