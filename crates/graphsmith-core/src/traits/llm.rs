//! External model capabilities
//!
//! Two narrow, duck-typed abstractions: text generation (prompt in, text
//! out) and embedding (text in, fixed-length vector out). Concrete
//! implementations live in `graphsmith-llm`.

use async_trait::async_trait;
use thiserror::Error;

/// Result alias for provider operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors raised by generation and embedding providers.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider configuration is invalid (missing API key, empty model).
    #[error("Provider configuration error: {0}")]
    Config(String),

    /// HTTP transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider responded but the payload could not be interpreted.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// An embedding came back with an unexpected length.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensions the provider instance was configured for
        expected: usize,
        /// Dimensions actually returned
        actual: usize,
    },
}

/// A text-generation capability: anything that maps a prompt to text.
///
/// One method does the work; the rest is identification for logging.
#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> LlmResult<String>;

    /// Human-readable provider name, e.g. "ollama".
    fn provider_name(&self) -> &str;

    /// Model identifier used for generation.
    fn model_name(&self) -> &str;
}

/// An embedding capability: maps text to fixed-length numeric vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// The result has the same order and length as the input, and each
    /// element is identical to what [`EmbeddingProvider::embed`] would
    /// return for it individually — batching exists purely for throughput.
    async fn embed_batch(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Fixed dimensionality of every vector this instance produces.
    fn dimensions(&self) -> usize;

    /// Release any warm resources (caches, loaded models) without
    /// destroying the instance. Safe to call redundantly; the default is
    /// a no-op for stateless providers.
    async fn clear_cache(&self) {}
}
