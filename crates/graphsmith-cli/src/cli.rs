use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphsmith")]
#[command(about = "Build and query knowledge graphs extracted from text by an LLM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (shortcut for RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SQLite database path (overrides GRAPHSMITH_DB_PATH)
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// LLM backend, 'ollama' or 'openai' (overrides GRAPHSMITH_LLM_PROVIDER)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// Generation model (overrides GRAPHSMITH_LLM_MODEL)
    #[arg(long, global = true)]
    pub llm_model: Option<String>,

    /// Provider base URL (overrides GRAPHSMITH_LLM_BASE_URL)
    #[arg(long, global = true)]
    pub llm_base_url: Option<String>,

    /// API key for the OpenAI backend (overrides OPENAI_API_KEY)
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// Embedding model (overrides GRAPHSMITH_EMBEDDING_MODEL)
    #[arg(long, global = true)]
    pub embedding_model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a document: chunk, extract, merge, embed, store
    Ingest {
        /// Read the document from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Pass the document inline
        #[arg(short, long)]
        text: Option<String>,

        /// Skip embedding generation (structural ingest only)
        #[arg(long)]
        no_embeddings: bool,

        /// Wipe the store before ingesting
        #[arg(long)]
        clear: bool,

        /// Maximum chunk size in characters (overrides GRAPHSMITH_CHUNK_SIZE)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Chunk overlap in characters (overrides GRAPHSMITH_CHUNK_OVERLAP)
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Find stored entities similar to a text query
    Similar {
        /// Query text to embed and match
        query: String,

        /// Maximum number of hits
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum cosine similarity for a hit
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Run a raw SQL query against the store and print rows as JSON
    Query {
        /// SQL to execute
        sql: String,
    },

    /// Export the stored graph to CSV files
    Export {
        /// Entities output path
        #[arg(long, default_value = "entities.csv")]
        entities: PathBuf,

        /// Relationships output path
        #[arg(long, default_value = "relationships.csv")]
        relationships: PathBuf,
    },

    /// Show node and edge counts
    Stats,

    /// Delete every node and edge from the store
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}
