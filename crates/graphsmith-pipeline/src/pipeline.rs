//! Pipeline orchestrator
//!
//! Coordinates chunking, extraction, merging, embedding, and storage.
//! Partial-failure policy: extraction failures degrade to empty fragments
//! inside the extractor, and embedding failures degrade from batched
//! requests to per-entity retries to skipping the entity with a warning;
//! storage failures abort the run, because losing writes silently is worse
//! than an incomplete embedding pass.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use graphsmith_core::chunking::TextChunker;
use graphsmith_core::graph::{merge_graphs, EmbeddingMap, KnowledgeGraph};
use graphsmith_core::traits::llm::EmbeddingProvider;
use graphsmith_core::traits::storage::{GraphStore, SimilarEntity};
use graphsmith_llm::extractor::GraphExtractor;

/// Entity names per embedding request. Small enough for one HTTP payload,
/// large enough to amortize round trips on big documents.
const EMBED_BATCH_SIZE: usize = 32;

/// Per-run ingestion switches
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Embed entity names after merging (off for fast structural runs)
    pub generate_embeddings: bool,
    /// Wipe the store before ingesting
    pub clear_store: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            generate_embeddings: true,
            clear_store: false,
        }
    }
}

/// What one ingestion run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub chunks_processed: usize,
    pub entities_extracted: usize,
    pub relationships_extracted: usize,
    pub embeddings_generated: usize,
}

/// The main pipeline orchestrator
///
/// All capabilities are injected, so frontends decide which providers and
/// store back the pipeline.
pub struct GraphPipeline {
    chunker: TextChunker,
    extractor: GraphExtractor,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn GraphStore>,
}

impl GraphPipeline {
    /// Create a pipeline from its injected capabilities.
    pub fn new(
        chunker: TextChunker,
        extractor: GraphExtractor,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            chunker,
            extractor,
            embedder,
            store,
        }
    }

    /// Ingest a document: chunk, extract, merge, embed, store.
    pub async fn process_text(&self, text: &str, options: &IngestOptions) -> Result<IngestStats> {
        if options.clear_store {
            self.store
                .clear_all()
                .await
                .context("Failed to clear the graph store")?;
            info!("Cleared graph store before ingestion");
        }

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            info!("Document is empty, nothing to ingest");
            return Ok(IngestStats::default());
        }
        info!(chunks = chunks.len(), "Chunked document");

        let fragments = self.extractor.extract_batch(&chunks).await;
        let merged = merge_graphs(fragments);
        info!(
            entities = merged.entities.len(),
            relationships = merged.relationships.len(),
            "Merged extraction fragments"
        );

        let embeddings = if options.generate_embeddings {
            self.embed_entities(&merged).await
        } else {
            EmbeddingMap::new()
        };

        let stats = IngestStats {
            chunks_processed: chunks.len(),
            entities_extracted: merged.entities.len(),
            relationships_extracted: merged.relationships.len(),
            embeddings_generated: embeddings.len(),
        };

        self.store
            .store_graph(&merged, &embeddings)
            .await
            .context("Failed to persist the merged graph")?;

        info!(?stats, "Ingestion complete");
        Ok(stats)
    }

    /// Ingest a document from a file path.
    pub async fn process_file(
        &self,
        path: impl AsRef<Path>,
        options: &IngestOptions,
    ) -> Result<IngestStats> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!(path = %path.display(), chars = text.chars().count(), "Read document");
        self.process_text(&text, options).await
    }

    /// Embed a free-text query and return the most similar stored entities.
    pub async fn find_similar(
        &self,
        query: &str,
        limit: usize,
        threshold: f64,
    ) -> Result<Vec<SimilarEntity>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .context("Failed to embed the query text")?;
        let hits = self
            .store
            .query_similar(&vector, limit, threshold)
            .await
            .context("Similarity query failed")?;
        Ok(hits)
    }

    /// Run a raw query against the store.
    pub async fn query_raw(
        &self,
        query: &str,
        params: &[serde_json::Value],
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
        self.store
            .query(query, params)
            .await
            .context("Raw query failed")
    }

    /// Remove everything from the store.
    pub async fn clear(&self) -> Result<()> {
        self.store
            .clear_all()
            .await
            .context("Failed to clear the graph store")
    }

    /// Embed entity names in batches. A failed batch is retried one entity
    /// at a time, and a failed entity is skipped with a warning rather than
    /// aborting the run.
    async fn embed_entities(&self, graph: &KnowledgeGraph) -> EmbeddingMap {
        let names: Vec<String> = graph.entities.iter().map(|e| e.name.clone()).collect();

        let mut embeddings = EmbeddingMap::new();
        for batch in names.chunks(EMBED_BATCH_SIZE) {
            match self.embedder.embed_batch(batch).await {
                Ok(vectors) => {
                    for (name, vector) in batch.iter().zip(vectors) {
                        embeddings.insert(name.clone(), vector);
                    }
                }
                Err(error) => {
                    warn!(%error, batch = batch.len(), "Batch embedding failed, retrying individually");
                    for name in batch {
                        match self.embedder.embed(name).await {
                            Ok(vector) => {
                                embeddings.insert(name.clone(), vector);
                            }
                            Err(error) => {
                                warn!(entity = %name, %error, "Skipping embedding for entity");
                            }
                        }
                    }
                }
            }
        }
        embeddings
    }
}
