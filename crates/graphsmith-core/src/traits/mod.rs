//! Trait abstractions at the seams of the pipeline
//!
//! The pipeline depends on these traits rather than concrete services, so
//! extraction and embedding are agnostic to the backing provider and the
//! store can be swapped out in tests.

pub mod llm;
pub mod storage;

pub use llm::{EmbeddingProvider, LlmError, LlmResult, TextGenerationProvider};
pub use storage::{GraphStore, SimilarEntity, StorageError, StorageResult};
