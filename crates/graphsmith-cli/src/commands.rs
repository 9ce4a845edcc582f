//! Command implementations
//!
//! Each command builds only what it needs: `similar` and `ingest` wire the
//! full pipeline, while `query`, `export`, `stats`, and `clear` talk to the
//! store directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use graphsmith_core::chunking::TextChunker;
use graphsmith_core::traits::storage::GraphStore;
use graphsmith_llm::config::{create_embedding_provider, create_text_provider};
use graphsmith_llm::extractor::GraphExtractor;
use graphsmith_pipeline::{GraphPipeline, IngestOptions, PipelineConfig};
use graphsmith_sqlite::SqliteGraphStore;

/// Open the store configured in `config`.
fn open_store(config: &PipelineConfig) -> Result<Arc<SqliteGraphStore>> {
    let store = SqliteGraphStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?;
    Ok(Arc::new(store))
}

/// Wire the full pipeline from configuration.
fn build_pipeline(config: &PipelineConfig) -> Result<(GraphPipeline, Arc<SqliteGraphStore>)> {
    let store = open_store(config)?;

    let text_provider = create_text_provider(config.text_provider_config()?)
        .context("Failed to create the text-generation provider")?;
    let embedder = create_embedding_provider(config.embedding_provider_config()?)
        .context("Failed to create the embedding provider")?;
    let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)
        .context("Invalid chunking configuration")?;
    let extractor = GraphExtractor::new(text_provider);

    let pipeline = GraphPipeline::new(chunker, extractor, embedder, store.clone());
    Ok((pipeline, store))
}

pub async fn ingest(
    config: &PipelineConfig,
    file: Option<PathBuf>,
    text: Option<String>,
    no_embeddings: bool,
    clear: bool,
) -> Result<()> {
    let (pipeline, _store) = build_pipeline(config)?;
    let options = IngestOptions {
        generate_embeddings: !no_embeddings,
        clear_store: clear,
    };

    let stats = match (file, text) {
        (Some(path), None) => pipeline.process_file(&path, &options).await?,
        (None, Some(text)) => pipeline.process_text(&text, &options).await?,
        _ => bail!("Provide the document with --file or --text"),
    };

    println!("Ingestion complete:");
    println!("  chunks processed:        {}", stats.chunks_processed);
    println!("  entities extracted:      {}", stats.entities_extracted);
    println!("  relationships extracted: {}", stats.relationships_extracted);
    println!("  embeddings generated:    {}", stats.embeddings_generated);
    Ok(())
}

pub async fn similar(
    config: &PipelineConfig,
    query: String,
    limit: Option<usize>,
    threshold: Option<f64>,
) -> Result<()> {
    let (pipeline, _store) = build_pipeline(config)?;
    let limit = limit.unwrap_or(config.similarity_limit);
    let threshold = threshold.unwrap_or(config.similarity_threshold);

    let hits = pipeline.find_similar(&query, limit, threshold).await?;
    if hits.is_empty() {
        println!("No entities above similarity {:.2}", threshold);
        return Ok(());
    }

    println!("{:<8} entity", "score");
    for hit in hits {
        println!("{:<8.4} {}", hit.score, hit.name);
    }
    Ok(())
}

pub async fn query(config: &PipelineConfig, sql: String) -> Result<()> {
    let store = open_store(config)?;
    let rows = store.query(&sql, &[]).await?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    info!(rows = rows.len(), "Query complete");
    Ok(())
}

pub async fn export(
    config: &PipelineConfig,
    entities: &Path,
    relationships: &Path,
) -> Result<()> {
    let store = open_store(config)?;

    let entity_rows = store
        .export_entities_to_file(entities)
        .with_context(|| format!("Failed to export entities to {}", entities.display()))?;
    let relationship_rows = store
        .export_relationships_to_file(relationships)
        .with_context(|| {
            format!(
                "Failed to export relationships to {}",
                relationships.display()
            )
        })?;

    println!("Exported {} entities to {}", entity_rows, entities.display());
    println!(
        "Exported {} relationships to {}",
        relationship_rows,
        relationships.display()
    );
    Ok(())
}

pub async fn stats(config: &PipelineConfig) -> Result<()> {
    let store = open_store(config)?;

    let nodes = store.count_nodes().await?;
    let edges = store.count_edges().await?;
    println!("database: {}", config.db_path.display());
    println!("nodes:    {}", nodes);
    println!("edges:    {}", edges);
    Ok(())
}

pub async fn clear(config: &PipelineConfig, yes: bool) -> Result<()> {
    if !yes {
        bail!("This deletes the whole graph; re-run with --yes to confirm");
    }

    let store = open_store(config)?;
    store.clear_all().await?;
    println!("Graph store cleared");
    Ok(())
}
