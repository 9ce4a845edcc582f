//! # Graphsmith Core
//!
//! Core data model and algorithms for building knowledge graphs from
//! unstructured text.
//!
//! This crate is deliberately free of I/O. It provides:
//!
//! - **Data model**: [`Entity`], [`Relationship`], and [`KnowledgeGraph`]
//!   with a closed [`PropertyValue`] scalar set for dynamic property bags
//! - **Chunking**: [`TextChunker`], a recursive character splitter with
//!   configurable separators and overlap
//! - **Merging**: [`merge_graphs`], the deterministic merge-and-reconcile
//!   reduction over per-chunk graph fragments
//! - **Similarity**: [`cosine_similarity`] used by storage backends for
//!   nearest-neighbor queries
//! - **Traits**: narrow abstractions over external capabilities
//!   ([`TextGenerationProvider`], [`EmbeddingProvider`]) and storage
//!   ([`GraphStore`])
//!
//! Concrete providers live in `graphsmith-llm`; the SQLite-backed store
//! lives in `graphsmith-sqlite`; orchestration lives in
//! `graphsmith-pipeline`.

pub mod chunking;
pub mod error;
pub mod graph;
pub mod similarity;
pub mod traits;

pub use chunking::{TextChunker, DEFAULT_SEPARATORS};
pub use error::{CoreError, CoreResult};
pub use graph::{
    merge_graphs, EmbeddingMap, Entity, KnowledgeGraph, Properties, PropertyValue, Relationship,
};
pub use similarity::cosine_similarity;
pub use traits::llm::{EmbeddingProvider, LlmError, LlmResult, TextGenerationProvider};
pub use traits::storage::{GraphStore, SimilarEntity, StorageError, StorageResult};
