//! `medrank`: rerank retrieved medical documents from the command line.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use medrank_core::{Document, MedrankError, RerankingMethod};
use medrank_rerank::HybridSearchManager;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;

#[derive(Parser)]
#[command(name = "medrank", about = "Medrank: hybrid reranking for medical RAG")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "medrank.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rerank a candidate set and print the results
    Search {
        /// Query text
        #[arg(short, long)]
        query: String,
        /// JSON file holding an array of candidate documents
        #[arg(long)]
        candidates: PathBuf,
        /// Number of results (overrides search.final_window)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Reranking method (overrides search.method)
        #[arg(short, long)]
        method: Option<RerankingMethod>,
    },
    /// Explain how a query would be scored
    Stats {
        /// Query text
        #[arg(short, long)]
        query: String,
        /// JSON file holding an array of candidate documents
        #[arg(long)]
        candidates: PathBuf,
    },
}

async fn read_candidates(path: &Path) -> anyhow::Result<Vec<Document>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(MedrankError::from)
        .with_context(|| format!("Failed to read candidates file '{}'", path.display()))?;
    let documents: Vec<Document> = serde_json::from_str(&raw)
        .map_err(MedrankError::from)
        .with_context(|| format!("Invalid candidates file '{}'", path.display()))?;
    Ok(documents)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Search {
            query,
            candidates,
            top_k,
            method,
        } => {
            if let Some(method) = method {
                config.search.method = method;
            }
            let manager = HybridSearchManager::with_bm25_params(
                config.search,
                config.bm25.k1,
                config.bm25.b,
            )?;
            let documents = read_candidates(&candidates).await?;

            info!(
                method = %manager.config().method,
                candidates = documents.len(),
                "Running hybrid search"
            );
            let results = manager.hybrid_search(&query, documents, top_k);
            info!(results = results.len(), "Hybrid search finished");

            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Stats { query, candidates } => {
            let manager = HybridSearchManager::with_bm25_params(
                config.search,
                config.bm25.k1,
                config.bm25.b,
            )?;
            let documents = read_candidates(&candidates).await?;

            let stats = manager.get_search_stats(&query, &documents);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
