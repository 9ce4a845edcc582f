//! Graph storage abstraction
//!
//! A property-graph store with merge-by-key upsert semantics and
//! similarity lookup over stored entity embeddings. The SQLite
//! implementation lives in `graphsmith-sqlite`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{EmbeddingMap, KnowledgeGraph, Properties};

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by graph stores.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend failure: connection, schema, or write errors.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A caller-supplied query failed; the backend's message is surfaced
    /// verbatim and the query is not retried.
    #[error("Query error: {0}")]
    Query(String),

    /// Stored data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// One similarity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarEntity {
    /// Entity name
    pub name: String,
    /// Cosine similarity against the query vector, in [-1, 1]
    pub score: f64,
}

/// A property-graph store with upsert semantics and similarity lookup.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create or update an entity node, keyed by name.
    ///
    /// Re-running with the same name merges `properties` key-wise into the
    /// stored bag (overwrite on conflict, new keys added) and overwrites
    /// the label. The embedding is only replaced when one is supplied.
    async fn upsert_entity(
        &self,
        name: &str,
        entity_type: &str,
        properties: &Properties,
        embedding: Option<&[f32]>,
    ) -> StorageResult<()>;

    /// Create or update a relationship edge, keyed by
    /// `(source, target, sanitized type)`.
    ///
    /// Missing endpoints are created as placeholder nodes rather than
    /// rejected, matching the merger's permissive policy.
    async fn upsert_relationship(
        &self,
        source: &str,
        target: &str,
        rel_type: &str,
        properties: &Properties,
    ) -> StorageResult<()>;

    /// Persist a merged graph: all entity upserts in graph order, then all
    /// relationship upserts in graph order.
    ///
    /// The first failing upsert aborts the call with its error; there is
    /// no partial-commit guarantee, but failures are never swallowed.
    async fn store_graph(
        &self,
        graph: &KnowledgeGraph,
        embeddings: &EmbeddingMap,
    ) -> StorageResult<()> {
        for entity in &graph.entities {
            let embedding = embeddings
                .get(&entity.name)
                .map(|v| v.as_slice())
                .or(entity.embedding.as_deref());
            self.upsert_entity(&entity.name, &entity.entity_type, &entity.properties, embedding)
                .await?;
        }
        for relationship in &graph.relationships {
            self.upsert_relationship(
                &relationship.source,
                &relationship.target,
                &relationship.rel_type,
                &relationship.properties,
            )
            .await?;
        }
        Ok(())
    }

    /// Find stored entities whose embeddings are similar to `query`.
    ///
    /// Scores are cosine similarities; results are filtered to
    /// `score >= threshold`, sorted descending (ties keep original
    /// retrieval order), and truncated to `limit`. Entities with zero-norm
    /// or missing embeddings never match.
    async fn query_similar(
        &self,
        query: &[f32],
        limit: usize,
        threshold: f64,
    ) -> StorageResult<Vec<SimilarEntity>>;

    /// Run a raw query string with positional parameters, returning rows
    /// as JSON objects keyed by column name.
    async fn query(
        &self,
        query: &str,
        params: &[serde_json::Value],
    ) -> StorageResult<Vec<serde_json::Map<String, serde_json::Value>>>;

    /// Remove all stored entities and relationships.
    ///
    /// Destructive; used only for explicit reset flows, never implicitly.
    async fn clear_all(&self) -> StorageResult<()>;
}
