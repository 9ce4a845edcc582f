//! # Graphsmith LLM
//!
//! LLM integration for Graphsmith: entity/relationship extraction and
//! text embeddings.
//!
//! ## Modules
//!
//! - [`extractor`]: the per-chunk extraction contract — prompt building,
//!   response parsing, and the degrade-to-empty partial-failure policy
//! - [`providers`]: text-generation providers (Ollama, OpenAI, mock)
//! - [`embeddings`]: embedding providers (Ollama, OpenAI, mock)
//! - [`config`]: provider configuration and factory functions
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graphsmith_llm::extractor::GraphExtractor;
//! use graphsmith_llm::providers::OllamaTextProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = OllamaTextProvider::new(
//!         "http://localhost:11434".to_string(),
//!         "llama3.1".to_string(),
//!         120,
//!     );
//!     let extractor = GraphExtractor::new(Arc::new(provider));
//!     let graph = extractor.extract("Alice works for Acme Corp.").await;
//!     println!("{} entities", graph.entities.len());
//! }
//! ```

pub mod config;
pub mod embeddings;
pub mod extractor;
pub mod providers;

pub use config::{
    create_embedding_provider, create_text_provider, EmbeddingProviderConfig, TextProviderConfig,
};
pub use extractor::GraphExtractor;

// Re-export the trait seams so callers need a single import.
pub use graphsmith_core::traits::llm::{
    EmbeddingProvider, LlmError, LlmResult, TextGenerationProvider,
};
