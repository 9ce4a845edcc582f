//! OpenAI embedding provider

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use graphsmith_core::traits::llm::{EmbeddingProvider, LlmError, LlmResult};

/// Embeddings via an OpenAI-compatible `/embeddings` endpoint.
///
/// Batching is native: one request carries the whole input list, and the
/// API echoes an index per vector so order is restored explicitly.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    /// Create a new OpenAI embedding provider.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimensions: usize,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            dimensions,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn request_embeddings(&self, input: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        let api_request = serde_json::json!({
            "model": self.model,
            "input": input,
        });

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::InvalidResponse(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if body.data.len() != input.len() {
            return Err(LlmError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                input.len(),
                body.data.len()
            )));
        }

        let mut ordered: Vec<Vec<f32>> = vec![Vec::new(); input.len()];
        for item in body.data {
            if item.embedding.len() != self.dimensions {
                return Err(LlmError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: item.embedding.len(),
                });
            }
            let slot = ordered.get_mut(item.index).ok_or_else(|| {
                LlmError::InvalidResponse(format!("Embedding index {} out of range", item.index))
            })?;
            *slot = item.embedding;
        }
        Ok(ordered)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>> {
        let mut embeddings = self.request_embeddings(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| LlmError::InvalidResponse("Empty embeddings response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
