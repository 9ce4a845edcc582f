//! Embedding providers
//!
//! Implementations of [`EmbeddingProvider`](graphsmith_core::traits::llm::EmbeddingProvider):
//!
//! - [`OllamaEmbeddingProvider`] — Ollama `/api/embeddings`
//! - [`OpenAiEmbeddingProvider`] — OpenAI `/embeddings` (native batching)
//! - [`MockEmbeddingProvider`] — deterministic vectors for tests
//!
//! Every provider reports a fixed dimensionality and errors with
//! [`LlmError::DimensionMismatch`](graphsmith_core::traits::llm::LlmError)
//! when the backing service returns a vector of a different length.

mod mock;
mod ollama;
mod openai;

pub use mock::MockEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
