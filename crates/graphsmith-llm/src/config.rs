//! Provider configuration and factories
//!
//! Configuration is an explicit struct built once at startup and passed
//! down; providers never read the environment themselves. All constructors
//! fill in the provider's documented defaults so call sites only override
//! what they care about.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use graphsmith_core::traits::llm::{
    EmbeddingProvider, LlmError, LlmResult, TextGenerationProvider,
};

use crate::embeddings::{MockEmbeddingProvider, OllamaEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::providers::{OllamaTextProvider, OpenAiTextProvider};

/// Default Ollama endpoint.
pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434";
/// Default OpenAI endpoint.
pub const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Text-generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum TextProviderConfig {
    /// Ollama local/remote generation service
    Ollama {
        /// Base URL for the Ollama API
        base_url: String,
        /// Model name
        model: String,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
    /// OpenAI chat-completion API
    OpenAi {
        /// API key
        api_key: String,
        /// Base URL (override for compatible gateways)
        base_url: String,
        /// Model name
        model: String,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
}

impl TextProviderConfig {
    /// Ollama configuration with defaults filled in.
    pub fn ollama(base_url: Option<String>, model: Option<String>) -> Self {
        Self::Ollama {
            base_url: base_url.unwrap_or_else(|| OLLAMA_DEFAULT_ENDPOINT.to_string()),
            model: model.unwrap_or_else(|| "llama3.1".to_string()),
            timeout_secs: 120,
        }
    }

    /// OpenAI configuration with defaults filled in.
    pub fn openai(api_key: String, model: Option<String>) -> Self {
        Self::OpenAi {
            api_key,
            base_url: OPENAI_DEFAULT_ENDPOINT.to_string(),
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            timeout_secs: 60,
        }
    }

    /// Model name for this configuration.
    pub fn model_name(&self) -> &str {
        match self {
            Self::Ollama { model, .. } => model,
            Self::OpenAi { model, .. } => model,
        }
    }

    /// Validate the configuration before constructing a provider.
    pub fn validate(&self) -> LlmResult<()> {
        match self {
            Self::Ollama { base_url, model, .. } => {
                if base_url.is_empty() {
                    return Err(LlmError::Config("Ollama base URL is empty".to_string()));
                }
                if model.is_empty() {
                    return Err(LlmError::Config("Ollama model name is empty".to_string()));
                }
            }
            Self::OpenAi { api_key, model, .. } => {
                if api_key.is_empty() {
                    return Err(LlmError::Config("OpenAI API key is missing".to_string()));
                }
                if model.is_empty() {
                    return Err(LlmError::Config("OpenAI model name is empty".to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingProviderConfig {
    /// Ollama embedding endpoint
    Ollama {
        /// Base URL for the Ollama API
        base_url: String,
        /// Embedding model name
        model: String,
        /// Expected vector dimensionality
        dimensions: usize,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
    /// OpenAI embeddings API
    OpenAi {
        /// API key
        api_key: String,
        /// Base URL
        base_url: String,
        /// Embedding model name
        model: String,
        /// Expected vector dimensionality
        dimensions: usize,
        /// Request timeout in seconds
        timeout_secs: u64,
    },
    /// Deterministic in-process provider for tests
    Mock {
        /// Vector dimensionality
        dimensions: usize,
    },
}

impl EmbeddingProviderConfig {
    /// Ollama configuration with defaults filled in
    /// (`nomic-embed-text`, 768 dimensions).
    pub fn ollama(base_url: Option<String>, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "nomic-embed-text".to_string());
        let dimensions = default_dimensions_for_model(&model);
        Self::Ollama {
            base_url: base_url.unwrap_or_else(|| OLLAMA_DEFAULT_ENDPOINT.to_string()),
            model,
            dimensions,
            timeout_secs: 60,
        }
    }

    /// OpenAI configuration with defaults filled in
    /// (`text-embedding-3-small`, 1536 dimensions).
    pub fn openai(api_key: String, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "text-embedding-3-small".to_string());
        let dimensions = default_dimensions_for_model(&model);
        Self::OpenAi {
            api_key,
            base_url: OPENAI_DEFAULT_ENDPOINT.to_string(),
            model,
            dimensions,
            timeout_secs: 30,
        }
    }

    /// Mock configuration for tests.
    pub fn mock(dimensions: usize) -> Self {
        Self::Mock { dimensions }
    }

    /// Validate the configuration before constructing a provider.
    pub fn validate(&self) -> LlmResult<()> {
        match self {
            Self::Ollama { base_url, model, dimensions, .. } => {
                if base_url.is_empty() || model.is_empty() {
                    return Err(LlmError::Config(
                        "Ollama embedding base URL and model are required".to_string(),
                    ));
                }
                if *dimensions == 0 {
                    return Err(LlmError::Config("dimensions must be non-zero".to_string()));
                }
            }
            Self::OpenAi { api_key, model, dimensions, .. } => {
                if api_key.is_empty() {
                    return Err(LlmError::Config("OpenAI API key is missing".to_string()));
                }
                if model.is_empty() {
                    return Err(LlmError::Config("OpenAI model name is empty".to_string()));
                }
                if *dimensions == 0 {
                    return Err(LlmError::Config("dimensions must be non-zero".to_string()));
                }
            }
            Self::Mock { dimensions } => {
                if *dimensions == 0 {
                    return Err(LlmError::Config("dimensions must be non-zero".to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Expected embedding dimensions for well-known models; unknown models
/// default to 768.
pub fn default_dimensions_for_model(model: &str) -> usize {
    match model {
        "nomic-embed-text" => 768,
        "text-embedding-3-small" => 1536,
        "text-embedding-3-large" => 3072,
        "text-embedding-ada-002" => 1536,
        _ => 768,
    }
}

/// Create a text-generation provider from configuration.
pub fn create_text_provider(
    config: TextProviderConfig,
) -> LlmResult<Arc<dyn TextGenerationProvider>> {
    config.validate()?;
    match config {
        TextProviderConfig::Ollama { base_url, model, timeout_secs } => {
            Ok(Arc::new(OllamaTextProvider::new(base_url, model, timeout_secs)))
        }
        TextProviderConfig::OpenAi { api_key, base_url, model, timeout_secs } => Ok(Arc::new(
            OpenAiTextProvider::new(api_key, base_url, model, timeout_secs),
        )),
    }
}

/// Create an embedding provider from configuration.
pub fn create_embedding_provider(
    config: EmbeddingProviderConfig,
) -> LlmResult<Arc<dyn EmbeddingProvider>> {
    config.validate()?;
    match config {
        EmbeddingProviderConfig::Ollama { base_url, model, dimensions, timeout_secs } => Ok(
            Arc::new(OllamaEmbeddingProvider::new(base_url, model, dimensions, timeout_secs)),
        ),
        EmbeddingProviderConfig::OpenAi {
            api_key,
            base_url,
            model,
            dimensions,
            timeout_secs,
        } => Ok(Arc::new(OpenAiEmbeddingProvider::new(
            api_key,
            base_url,
            model,
            dimensions,
            timeout_secs,
        ))),
        EmbeddingProviderConfig::Mock { dimensions } => {
            Ok(Arc::new(MockEmbeddingProvider::with_dimensions(dimensions)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_defaults() {
        let config = TextProviderConfig::ollama(None, None);
        assert!(config.validate().is_ok());
        assert_eq!(config.model_name(), "llama3.1");

        let config = EmbeddingProviderConfig::ollama(None, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn openai_requires_api_key() {
        let config = TextProviderConfig::openai(String::new(), None);
        assert!(config.validate().is_err());

        let config = EmbeddingProviderConfig::openai(String::new(), None);
        assert!(config.validate().is_err());

        let config = TextProviderConfig::openai("sk-test".to_string(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn known_model_dimensions() {
        assert_eq!(default_dimensions_for_model("nomic-embed-text"), 768);
        assert_eq!(default_dimensions_for_model("text-embedding-3-small"), 1536);
        assert_eq!(default_dimensions_for_model("text-embedding-3-large"), 3072);
        assert_eq!(default_dimensions_for_model("something-else"), 768);
    }

    #[test]
    fn factory_rejects_invalid_config() {
        assert!(create_text_provider(TextProviderConfig::openai(String::new(), None)).is_err());
        assert!(create_embedding_provider(EmbeddingProviderConfig::mock(0)).is_err());
    }
}
