//! GraphStore implementation over SQLite
//!
//! Nodes are keyed by entity name and edges by `(source, target, label)`.
//! Upserts merge property bags key-wise instead of replacing them, so
//! re-ingesting a document enriches existing entities rather than wiping
//! what earlier runs learned.
//!
//! rusqlite is synchronous, so every operation clones the pool handle and
//! runs the SQL inside `tokio::task::spawn_blocking`.

use std::cmp::Ordering;

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use graphsmith_core::graph::{EmbeddingMap, KnowledgeGraph, Properties};
use graphsmith_core::similarity::cosine_similarity;
use graphsmith_core::traits::storage::{GraphStore, SimilarEntity, StorageError, StorageResult};

use crate::config::SqliteConfig;
use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};

/// Label assigned to nodes created only because an edge referenced them.
const PLACEHOLDER_LABEL: &str = "Entity";

/// Edge label used when sanitization leaves nothing usable.
const FALLBACK_EDGE_LABEL: &str = "RELATED_TO";

/// SQLite-backed property-graph store
#[derive(Clone)]
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

/// An entity row as stored, used by exports and lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub name: String,
    pub label: String,
    pub properties: Properties,
    pub embedding: Option<Vec<f32>>,
}

impl SqliteGraphStore {
    /// Wrap an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a file-backed store
    pub fn open(path: impl AsRef<std::path::Path>) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::new(SqliteConfig::new(path))?))
    }

    /// In-memory store for tests
    pub fn memory() -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::memory()?))
    }

    /// Access the underlying pool (exports, maintenance queries)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch one entity row by name
    pub async fn get_entity(&self, name: &str) -> SqliteResult<Option<StoredEntity>> {
        let pool = self.pool.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let row = conn
                    .query_row(
                        "SELECT name, label, properties, embedding FROM nodes WHERE name = ?1",
                        [&name],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, Option<String>>(3)?,
                            ))
                        },
                    )
                    .optional()?;

                row.map(|(name, label, props_json, embedding_json)| {
                    Ok(StoredEntity {
                        name,
                        label,
                        properties: serde_json::from_str(&props_json)?,
                        embedding: embedding_json
                            .map(|json| serde_json::from_str(&json))
                            .transpose()?,
                    })
                })
                .transpose()
            })
        })
        .await
        .map_err(|e| SqliteError::Connection(e.to_string()))?
    }

    /// Count stored nodes
    pub async fn count_nodes(&self) -> SqliteResult<u64> {
        self.count("nodes").await
    }

    /// Count stored edges
    pub async fn count_edges(&self) -> SqliteResult<u64> {
        self.count("edges").await
    }

    async fn count(&self, table: &'static str) -> SqliteResult<u64> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let count: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", table),
                    [],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
        })
        .await
        .map_err(|e| SqliteError::Connection(e.to_string()))?
    }
}

/// Normalize an edge label: uppercase, word separators become
/// underscores, anything else is dropped.
fn sanitize_edge_label(raw: &str) -> String {
    let label: String = raw
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            c if c.is_alphanumeric() || c == '_' => Some(c.to_ascii_uppercase()),
            _ => None,
        })
        .collect();

    if label.is_empty() {
        FALLBACK_EDGE_LABEL.to_string()
    } else {
        label
    }
}

/// Merge `incoming` into the stored property bag for a node or edge.
fn merge_property_json(existing: Option<String>, incoming: &Properties) -> SqliteResult<String> {
    let mut merged: Properties = match existing {
        Some(json) => serde_json::from_str(&json)?,
        None => Properties::new(),
    };
    merged.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(serde_json::to_string(&merged)?)
}

fn upsert_entity_sync(
    conn: &Connection,
    name: &str,
    label: &str,
    properties: &Properties,
    embedding: Option<&Vec<f32>>,
) -> SqliteResult<()> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT properties FROM nodes WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;

    let props_json = merge_property_json(existing, properties)?;
    let embedding_json = embedding.map(serde_json::to_string).transpose()?;

    conn.execute(
        r#"
        INSERT INTO nodes (name, label, properties, embedding)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(name) DO UPDATE SET
            label = excluded.label,
            properties = excluded.properties,
            embedding = COALESCE(excluded.embedding, nodes.embedding),
            updated_at = datetime('now')
        "#,
        params![name, label, props_json, embedding_json],
    )?;

    Ok(())
}

fn upsert_relationship_sync(
    conn: &Connection,
    source: &str,
    target: &str,
    label: &str,
    properties: &Properties,
) -> SqliteResult<()> {
    // Edges may reference entities no extraction produced; create
    // placeholders so the edge is never dropped.
    for endpoint in [source, target] {
        conn.execute(
            "INSERT OR IGNORE INTO nodes (name, label) VALUES (?1, ?2)",
            params![endpoint, PLACEHOLDER_LABEL],
        )?;
    }

    let existing: Option<String> = conn
        .query_row(
            "SELECT properties FROM edges WHERE source = ?1 AND target = ?2 AND label = ?3",
            params![source, target, label],
            |row| row.get(0),
        )
        .optional()?;

    let props_json = merge_property_json(existing, properties)?;

    conn.execute(
        r#"
        INSERT INTO edges (source, target, label, properties)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(source, target, label) DO UPDATE SET
            properties = excluded.properties,
            updated_at = datetime('now')
        "#,
        params![source, target, label, props_json],
    )?;

    Ok(())
}

/// Convert a JSON parameter to a SQLite value for binding.
fn json_to_sql(value: &serde_json::Value) -> rusqlite::types::Value {
    use rusqlite::types::Value;

    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(*b as i64),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        // Arrays and objects bind as their JSON text
        other => Value::Text(other.to_string()),
    }
}

/// Convert a result cell to JSON for row output.
fn sql_to_json(value: rusqlite::types::ValueRef<'_>) -> serde_json::Value {
    use rusqlite::types::ValueRef;

    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::Array(
            b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
        ),
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn upsert_entity(
        &self,
        name: &str,
        entity_type: &str,
        properties: &Properties,
        embedding: Option<&[f32]>,
    ) -> StorageResult<()> {
        let pool = self.pool.clone();
        let name = name.to_string();
        let label = entity_type.to_string();
        let properties = properties.clone();
        let embedding = embedding.map(<[f32]>::to_vec);

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                upsert_entity_sync(conn, &name, &label, &properties, embedding.as_ref())
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn upsert_relationship(
        &self,
        source: &str,
        target: &str,
        rel_type: &str,
        properties: &Properties,
    ) -> StorageResult<()> {
        let pool = self.pool.clone();
        let source = source.to_string();
        let target = target.to_string();
        let label = sanitize_edge_label(rel_type);
        let properties = properties.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                upsert_relationship_sync(conn, &source, &target, &label, &properties)
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn store_graph(
        &self,
        graph: &KnowledgeGraph,
        embeddings: &EmbeddingMap,
    ) -> StorageResult<()> {
        let pool = self.pool.clone();
        let graph = graph.clone();
        let embeddings = embeddings.clone();

        // One blocking task for the whole batch keeps ingestion from
        // bouncing through the blocking pool once per element.
        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                for entity in &graph.entities {
                    let embedding = embeddings
                        .get(&entity.name)
                        .or(entity.embedding.as_ref());
                    upsert_entity_sync(
                        conn,
                        &entity.name,
                        &entity.entity_type,
                        &entity.properties,
                        embedding,
                    )?;
                }
                for relationship in &graph.relationships {
                    upsert_relationship_sync(
                        conn,
                        &relationship.source,
                        &relationship.target,
                        &sanitize_edge_label(&relationship.rel_type),
                        &relationship.properties,
                    )?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn query_similar(
        &self,
        query: &[f32],
        limit: usize,
        threshold: f64,
    ) -> StorageResult<Vec<SimilarEntity>> {
        let pool = self.pool.clone();
        let query = query.to_vec();

        let mut hits: Vec<SimilarEntity> = tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name, embedding FROM nodes
                     WHERE embedding IS NOT NULL
                     ORDER BY rowid",
                )?;

                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut hits = Vec::new();
                for row in rows {
                    let (name, embedding_json) = row?;
                    let embedding: Vec<f32> = serde_json::from_str(&embedding_json)?;
                    // Zero-norm and mismatched vectors simply never match.
                    if let Some(score) = cosine_similarity(&query, &embedding) {
                        if score >= threshold {
                            hits.push(SimilarEntity { name, score });
                        }
                    }
                }
                Ok(hits)
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(|e: SqliteError| StorageError::from(e))?;

        // Stable sort: ties keep insertion order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);

        debug!(hits = hits.len(), limit, threshold, "Similarity query done");
        Ok(hits)
    }

    async fn query(
        &self,
        query: &str,
        params: &[serde_json::Value],
    ) -> StorageResult<Vec<serde_json::Map<String, serde_json::Value>>> {
        let pool = self.pool.clone();
        let query = query.to_string();
        let bound: Vec<rusqlite::types::Value> = params.iter().map(json_to_sql).collect();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                let mut stmt = conn
                    .prepare(&query)
                    .map_err(|e| SqliteError::Query(e.to_string()))?;
                let columns: Vec<String> =
                    stmt.column_names().iter().map(|c| c.to_string()).collect();

                let mut rows = stmt
                    .query(params_from_iter(bound))
                    .map_err(|e| SqliteError::Query(e.to_string()))?;

                let mut out = Vec::new();
                while let Some(row) = rows.next().map_err(|e| SqliteError::Query(e.to_string()))? {
                    let mut object = serde_json::Map::new();
                    for (index, column) in columns.iter().enumerate() {
                        let value = row
                            .get_ref(index)
                            .map_err(|e| SqliteError::Query(e.to_string()))?;
                        object.insert(column.clone(), sql_to_json(value));
                    }
                    out.push(object);
                }
                Ok(out)
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(Into::into)
    }

    async fn clear_all(&self) -> StorageResult<()> {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            pool.with_connection(|conn| {
                // Edges first so foreign keys never block the node sweep.
                conn.execute("DELETE FROM edges", [])?;
                conn.execute("DELETE FROM nodes", [])?;
                Ok(())
            })
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
        .map_err(Into::into)
    }
}
