//! Ingestion pipeline orchestration
//!
//! This crate coordinates, it doesn't implement business logic:
//!
//! 1. **Chunk**: split the document into overlapping windows
//! 2. **Extract**: one LLM call per chunk yields a graph fragment
//! 3. **Merge**: fragments are deduplicated into a single graph
//! 4. **Embed**: entity names become vectors for similarity search
//! 5. **Store**: the merged graph is upserted into the graph store
//!
//! Every capability is injected via constructor, so the pipeline runs
//! identically against mock providers in tests and real ones in the CLI.

pub mod config;
pub mod pipeline;

pub use config::{PipelineConfig, ProviderKind};
pub use pipeline::{GraphPipeline, IngestOptions, IngestStats};
