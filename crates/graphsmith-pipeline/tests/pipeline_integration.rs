//! End-to-end pipeline tests against mock providers and an in-memory
//! SQLite store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use graphsmith_core::chunking::TextChunker;
use graphsmith_core::traits::llm::{EmbeddingProvider, LlmError, LlmResult};
use graphsmith_llm::embeddings::MockEmbeddingProvider;
use graphsmith_llm::extractor::GraphExtractor;
use graphsmith_llm::providers::MockTextProvider;
use graphsmith_pipeline::{GraphPipeline, IngestOptions};
use graphsmith_sqlite::SqliteGraphStore;

const EXTRACTION_RESPONSE: &str = r#"{
    "entities": [
        {"name": "Marie Curie", "type": "Person", "properties": {"field": "physics"}},
        {"name": "Sorbonne", "type": "Organization", "properties": {}}
    ],
    "relationships": [
        {"source": "Marie Curie", "target": "Sorbonne", "type": "taught at", "properties": {}}
    ]
}"#;

fn build_pipeline(
    text_provider: Arc<MockTextProvider>,
    store: Arc<SqliteGraphStore>,
) -> GraphPipeline {
    let chunker = TextChunker::new(1000, 200).unwrap();
    let extractor = GraphExtractor::new(text_provider);
    let embedder = Arc::new(MockEmbeddingProvider::new());
    GraphPipeline::new(chunker, extractor, embedder, store)
}

#[tokio::test]
async fn ingest_stores_merged_graph_with_embeddings() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider, store.clone());

    let stats = pipeline
        .process_text(
            "Marie Curie taught at the Sorbonne.",
            &IngestOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(stats.chunks_processed, 1);
    assert_eq!(stats.entities_extracted, 2);
    assert_eq!(stats.relationships_extracted, 1);
    assert_eq!(stats.embeddings_generated, 2);

    let curie = store.get_entity("Marie Curie").await.unwrap().unwrap();
    assert_eq!(curie.label, "Person");
    assert!(curie.embedding.is_some());
    assert_eq!(store.count_edges().await.unwrap(), 1);
}

#[tokio::test]
async fn ingest_without_embeddings_leaves_nodes_unembedded() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider, store.clone());

    let options = IngestOptions {
        generate_embeddings: false,
        clear_store: false,
    };
    let stats = pipeline.process_text("text", &options).await.unwrap();

    assert_eq!(stats.embeddings_generated, 0);
    let curie = store.get_entity("Marie Curie").await.unwrap().unwrap();
    assert!(curie.embedding.is_none());
}

#[tokio::test]
async fn failed_chunk_extraction_does_not_abort_the_run() {
    let provider = Arc::new(MockTextProvider::new());
    // First chunk fails, second parses.
    provider.push_failure("model unavailable");
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());

    // Small chunker so the document splits into at least two chunks.
    let chunker = TextChunker::new(40, 10).unwrap();
    let extractor = GraphExtractor::new(provider);
    let embedder = Arc::new(MockEmbeddingProvider::new());
    let pipeline = GraphPipeline::new(chunker, extractor, embedder, store.clone());

    let text = "First paragraph about physics.\n\nSecond paragraph about chemistry and more.";
    let stats = pipeline
        .process_text(text, &IngestOptions::default())
        .await
        .unwrap();

    assert!(stats.chunks_processed >= 2);
    assert_eq!(stats.entities_extracted, 2);
    assert_eq!(store.count_nodes().await.unwrap(), 2);
}

#[tokio::test]
async fn empty_document_is_a_noop() {
    let provider = Arc::new(MockTextProvider::new());
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider.clone(), store.clone());

    let stats = pipeline
        .process_text("", &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats, Default::default());
    assert_eq!(provider.call_count(), 0);
    assert_eq!(store.count_nodes().await.unwrap(), 0);
}

#[tokio::test]
async fn clear_store_option_wipes_previous_runs() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    provider.push_response(
        r#"{"entities": [{"name": "Fresh", "type": "Concept", "properties": {}}], "relationships": []}"#,
    );
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider, store.clone());

    pipeline
        .process_text("first document", &IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(store.count_nodes().await.unwrap(), 2);

    let options = IngestOptions {
        generate_embeddings: true,
        clear_store: true,
    };
    pipeline.process_text("second document", &options).await.unwrap();

    assert_eq!(store.count_nodes().await.unwrap(), 1);
    assert!(store.get_entity("Fresh").await.unwrap().is_some());
}

/// Embedder that only works through `embed_batch`; single-text calls fail.
/// Distinguishes the batched ingestion path from per-entity calls.
struct BatchOnlyEmbedder {
    batch_calls: AtomicUsize,
}

impl BatchOnlyEmbedder {
    fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for BatchOnlyEmbedder {
    async fn embed(&self, _text: &str) -> LlmResult<Vec<f32>> {
        Err(LlmError::Http("single-text endpoint disabled".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Embedder whose batch endpoint always fails but single-text calls work.
struct BatchFailingEmbedder;

#[async_trait]
impl EmbeddingProvider for BatchFailingEmbedder {
    async fn embed(&self, text: &str) -> LlmResult<Vec<f32>> {
        Ok(vec![text.len() as f32, 1.0])
    }

    async fn embed_batch(&self, _texts: &[String]) -> LlmResult<Vec<Vec<f32>>> {
        Err(LlmError::Http("batch endpoint unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        2
    }
}

#[tokio::test]
async fn ingestion_embeds_entity_names_in_batches() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let embedder = Arc::new(BatchOnlyEmbedder::new());

    let chunker = TextChunker::new(1000, 200).unwrap();
    let extractor = GraphExtractor::new(provider);
    let pipeline = GraphPipeline::new(chunker, extractor, embedder.clone(), store.clone());

    let stats = pipeline
        .process_text("doc", &IngestOptions::default())
        .await
        .unwrap();

    // Both entity names fit one batch; no per-entity calls were needed.
    assert_eq!(stats.embeddings_generated, 2);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    let curie = store.get_entity("Marie Curie").await.unwrap().unwrap();
    assert!(curie.embedding.is_some());
}

#[tokio::test]
async fn failed_embedding_batch_falls_back_to_single_calls() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());

    let chunker = TextChunker::new(1000, 200).unwrap();
    let extractor = GraphExtractor::new(provider);
    let pipeline = GraphPipeline::new(
        chunker,
        extractor,
        Arc::new(BatchFailingEmbedder),
        store.clone(),
    );

    let stats = pipeline
        .process_text("doc", &IngestOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.embeddings_generated, 2);
    let sorbonne = store.get_entity("Sorbonne").await.unwrap().unwrap();
    assert!(sorbonne.embedding.is_some());
}

#[tokio::test]
async fn find_similar_roundtrips_through_the_embedder() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider, store.clone());

    pipeline
        .process_text("doc", &IngestOptions::default())
        .await
        .unwrap();

    // The mock embedder is deterministic, so querying with an exact
    // entity name scores 1.0 against that entity's stored vector.
    let hits = pipeline.find_similar("Marie Curie", 5, 0.99).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Marie Curie");
    assert!(hits[0].score > 0.99);
}

#[tokio::test]
async fn raw_query_reaches_the_store() {
    let provider = Arc::new(MockTextProvider::new());
    provider.push_response(EXTRACTION_RESPONSE);
    let store = Arc::new(SqliteGraphStore::memory().unwrap());
    let pipeline = build_pipeline(provider, store.clone());

    pipeline
        .process_text("doc", &IngestOptions::default())
        .await
        .unwrap();

    let rows = pipeline
        .query_raw(
            "SELECT COUNT(*) AS n FROM nodes WHERE label = ?1",
            &[serde_json::json!("Person")],
        )
        .await
        .unwrap();
    assert_eq!(rows[0].get("n"), Some(&serde_json::json!(1)));
}
