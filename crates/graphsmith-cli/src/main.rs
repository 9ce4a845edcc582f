use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphsmith_cli::cli::{Cli, Commands};
use graphsmith_cli::commands;
use graphsmith_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading configuration from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                ["core", "llm", "sqlite", "pipeline", "cli"]
                    .map(|krate| format!("graphsmith_{}={}", krate, default_filter))
                    .join(","),
            )
        }))
        .with_writer(std::io::stderr)
        .init();

    let mut config = PipelineConfig::from_env()?;
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }
    if let Some(provider) = cli.llm_provider {
        config.provider = provider.parse()?;
    }
    if let Some(llm_model) = cli.llm_model {
        config.llm_model = Some(llm_model);
    }
    if let Some(llm_base_url) = cli.llm_base_url {
        config.llm_base_url = Some(llm_base_url);
    }
    if let Some(llm_api_key) = cli.llm_api_key {
        config.openai_api_key = Some(llm_api_key);
    }
    if let Some(embedding_model) = cli.embedding_model {
        config.embedding_model = Some(embedding_model);
    }

    match cli.command {
        Commands::Ingest {
            file,
            text,
            no_embeddings,
            clear,
            chunk_size,
            chunk_overlap,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = chunk_overlap {
                config.chunk_overlap = chunk_overlap;
            }
            commands::ingest(&config, file, text, no_embeddings, clear).await?
        }

        Commands::Similar {
            query,
            limit,
            threshold,
        } => commands::similar(&config, query, limit, threshold).await?,

        Commands::Query { sql } => commands::query(&config, sql).await?,

        Commands::Export {
            entities,
            relationships,
        } => commands::export(&config, &entities, &relationships).await?,

        Commands::Stats => commands::stats(&config).await?,

        Commands::Clear { yes } => commands::clear(&config, yes).await?,
    }

    Ok(())
}
