//! Mock extraction backend for deterministic testing.
//!
//! Returns queued or fixed responses without any network traffic and logs
//! every request it receives, so tests can assert both the output and the
//! calls the orchestrator made.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mkgraph_core::{EntityExtractor, ExtractionRequest, Result};

/// Mock extraction backend.
#[derive(Clone)]
pub struct MockExtractor {
    queued: Arc<Mutex<Vec<String>>>,
    default_response: String,
    call_log: Arc<Mutex<Vec<ExtractionRequest>>>,
}

impl MockExtractor {
    /// Create a mock that answers every call with an empty JSON array.
    pub fn new() -> Self {
        Self {
            queued: Arc::new(Mutex::new(Vec::new())),
            default_response: "[]".to_string(),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned once the queue is exhausted.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a response; queued responses are consumed in order before
    /// the fixed response applies.
    pub fn push_response(&self, response: impl Into<String>) {
        self.queued.lock().unwrap().insert(0, response.into());
    }

    /// Requests seen so far.
    pub fn calls(&self) -> Vec<ExtractionRequest> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of extraction calls made.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityExtractor for MockExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        self.call_log.lock().unwrap().push(request.clone());
        let queued = self.queued.lock().unwrap().pop();
        Ok(queued.unwrap_or_else(|| self.default_response.clone()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkgraph_core::SourceDocument;

    fn request(content: &str) -> ExtractionRequest {
        ExtractionRequest::Single(SourceDocument::new("a.md", content))
    }

    #[tokio::test]
    async fn test_queued_responses_consumed_in_order() {
        let mock = MockExtractor::new().with_fixed_response("fixed");
        mock.push_response("first");
        mock.push_response("second");

        assert_eq!(mock.extract(&request("1")).await.unwrap(), "first");
        assert_eq!(mock.extract(&request("2")).await.unwrap(), "second");
        assert_eq!(mock.extract(&request("3")).await.unwrap(), "fixed");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_call_log_records_requests() {
        let mock = MockExtractor::new();
        mock.extract(&request("hello")).await.unwrap();
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], ExtractionRequest::Single(doc) if doc.content == "hello"));
    }
}
