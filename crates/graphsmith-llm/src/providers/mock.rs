//! Mock text-generation provider for testing
//!
//! Returns deterministic responses without requiring API keys or network
//! calls, and records the prompts it was given so tests can verify the
//! extraction contract.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use graphsmith_core::traits::llm::{LlmError, LlmResult, TextGenerationProvider};

/// Mock text-generation provider.
///
/// Responses are served from a FIFO queue; when the queue is empty the
/// default response is returned. Uses interior mutability, so `&self` is
/// sufficient everywhere.
pub struct MockTextProvider {
    responses: Mutex<VecDeque<LlmResult<String>>>,
    default_response: String,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    /// Create a mock provider with an empty-graph default response.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: r#"{"entities": [], "relationships": []}"#.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response to be returned by the next call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    /// Queue a failure to be returned by the next call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(LlmError::Http(message.into())));
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationProvider for MockTextProvider {
    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.default_response.clone()),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let provider = MockTextProvider::new();
        provider.push_response("first");
        provider.push_response("second");

        assert_eq!(provider.generate("a").await.unwrap(), "first");
        assert_eq!(provider.generate("b").await.unwrap(), "second");
        // Queue exhausted: default response.
        assert!(provider.generate("c").await.unwrap().contains("entities"));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failures_can_be_queued() {
        let provider = MockTextProvider::new();
        provider.push_failure("connection refused");

        assert!(provider.generate("a").await.is_err());
    }
}
