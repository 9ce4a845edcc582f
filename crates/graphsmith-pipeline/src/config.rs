//! Runtime configuration from the environment
//!
//! Everything has a default suitable for a local Ollama setup; OpenAI
//! needs only `GRAPHSMITH_LLM_PROVIDER=openai` plus `OPENAI_API_KEY`.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use graphsmith_llm::config::{EmbeddingProviderConfig, TextProviderConfig};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "graphsmith.db";

/// Which LLM backend to use for both generation and embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Ollama,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => bail!("Unknown LLM provider '{}', expected 'ollama' or 'openai'", other),
        }
    }
}

/// Pipeline-wide configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// SQLite database path
    pub db_path: PathBuf,
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// LLM backend for extraction and embeddings
    pub provider: ProviderKind,
    /// Generation model override
    pub llm_model: Option<String>,
    /// Base URL override (Ollama host, or an OpenAI-compatible gateway)
    pub llm_base_url: Option<String>,
    /// OpenAI API key, required when `provider` is OpenAi
    pub openai_api_key: Option<String>,
    /// Embedding model override
    pub embedding_model: Option<String>,
    /// Default number of similarity hits
    pub similarity_limit: usize,
    /// Default minimum cosine similarity for a hit
    pub similarity_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            chunk_size: 1000,
            chunk_overlap: 200,
            provider: ProviderKind::default(),
            llm_model: None,
            llm_base_url: None,
            openai_api_key: None,
            embedding_model: None,
            similarity_limit: 10,
            similarity_threshold: 0.7,
        }
    }
}

impl PipelineConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            db_path: env_var("GRAPHSMITH_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            chunk_size: env_parse("GRAPHSMITH_CHUNK_SIZE")?.unwrap_or(defaults.chunk_size),
            chunk_overlap: env_parse("GRAPHSMITH_CHUNK_OVERLAP")?
                .unwrap_or(defaults.chunk_overlap),
            provider: env_parse("GRAPHSMITH_LLM_PROVIDER")?.unwrap_or(defaults.provider),
            llm_model: env_var("GRAPHSMITH_LLM_MODEL"),
            llm_base_url: env_var("GRAPHSMITH_LLM_BASE_URL"),
            openai_api_key: env_var("OPENAI_API_KEY"),
            embedding_model: env_var("GRAPHSMITH_EMBEDDING_MODEL"),
            similarity_limit: env_parse("GRAPHSMITH_SIMILARITY_LIMIT")?
                .unwrap_or(defaults.similarity_limit),
            similarity_threshold: env_parse("GRAPHSMITH_SIMILARITY_THRESHOLD")?
                .unwrap_or(defaults.similarity_threshold),
        })
    }

    /// Text-generation provider configuration for the selected backend.
    pub fn text_provider_config(&self) -> Result<TextProviderConfig> {
        match self.provider {
            ProviderKind::Ollama => Ok(TextProviderConfig::ollama(
                self.llm_base_url.clone(),
                self.llm_model.clone(),
            )),
            ProviderKind::OpenAi => {
                let api_key = self
                    .openai_api_key
                    .clone()
                    .context("OPENAI_API_KEY is required when the provider is 'openai'")?;
                Ok(TextProviderConfig::openai(api_key, self.llm_model.clone()))
            }
        }
    }

    /// Embedding provider configuration for the selected backend.
    pub fn embedding_provider_config(&self) -> Result<EmbeddingProviderConfig> {
        match self.provider {
            ProviderKind::Ollama => Ok(EmbeddingProviderConfig::ollama(
                self.llm_base_url.clone(),
                self.embedding_model.clone(),
            )),
            ProviderKind::OpenAi => {
                let api_key = self
                    .openai_api_key
                    .clone()
                    .context("OPENAI_API_KEY is required when the provider is 'openai'")?;
                Ok(EmbeddingProviderConfig::openai(
                    api_key,
                    self.embedding_model.clone(),
                ))
            }
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read and parse an environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
        })
        .transpose()
}
