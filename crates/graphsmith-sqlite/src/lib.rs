//! SQLite property-graph storage
//!
//! Implements the `GraphStore` trait from `graphsmith-core` on top of a
//! plain SQLite file: a `nodes` table keyed by entity name and an `edges`
//! table keyed by `(source, target, label)`. Property bags and embeddings
//! are stored as JSON text columns, which keeps the schema stable while
//! property keys evolve.
//!
//! Similarity search is brute-force: embeddings are loaded and scored in
//! process with cosine similarity. Graphs in the tens of thousands of
//! nodes stay well under interactive latency, and there is no extension
//! or index to install.

pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod graph_store;
pub mod schema;

pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use graph_store::SqliteGraphStore;
