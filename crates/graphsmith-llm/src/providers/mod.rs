//! Text-generation providers
//!
//! Implementations of [`TextGenerationProvider`](graphsmith_core::traits::llm::TextGenerationProvider):
//!
//! - [`OllamaTextProvider`] — local/remote Ollama `/api/generate`
//! - [`OpenAiTextProvider`] — OpenAI-compatible `/chat/completions`
//! - [`MockTextProvider`] — deterministic provider for tests

mod mock;
mod ollama;
mod openai;

pub use mock::MockTextProvider;
pub use ollama::OllamaTextProvider;
pub use openai::OpenAiTextProvider;
