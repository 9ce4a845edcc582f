//! Mock embedding provider for testing
//!
//! Produces deterministic vectors derived from the input text, so the same
//! text always maps to the same embedding and different texts to different
//! ones — enough structure for similarity-search tests without a model.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use graphsmith_core::traits::llm::{EmbeddingProvider, LlmResult};

/// Deterministic in-process embedding provider.
///
/// Keeps an internal cache keyed by input text (standing in for the warm
/// model a real embedder holds); [`EmbeddingProvider::clear_cache`]
/// releases it and is safe to call any number of times.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl MockEmbeddingProvider {
    /// Create a provider producing 768-dimensional vectors.
    pub fn new() -> Self {
        Self::with_dimensions(768)
    }

    /// Create a provider producing vectors of a specific length.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached embeddings, for verifying cache behavior in tests.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    fn compute(&self, text: &str) -> Vec<f32> {
        // FNV-style rolling hash, decorrelated per dimension.
        let mut state: u64 = 0xcbf29ce484222325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x100000001b3);
        }

        (0..self.dimensions)
            .map(|i| {
                let mixed = state
                    .wrapping_add(i as u64)
                    .wrapping_mul(0x9e3779b97f4a7c15);
                // Map to [-1, 1).
                (mixed >> 11) as f32 / (1u64 << 53) as f32 * 2.0 - 1.0
            })
            .collect()
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.get(text) {
            return Ok(cached.clone());
        }
        let embedding = self.compute(text);
        cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }
}
