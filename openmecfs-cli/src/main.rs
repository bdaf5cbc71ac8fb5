//! Open ME/CFS CLI — drives the core evidence pipeline from the terminal.
//!
//! The platform exposes its operations as library calls; this binary is
//! the self-contained surface for them: dataset import, per-paper sync
//! and evidence generation, hypothesis synthesis, search, stats, graph,
//! and cache administration.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use openmecfs_core::config::PlatformConfig;
use openmecfs_core::embedding::create_embedder;
use openmecfs_core::engine::{parse_dataset, EvidenceEngine};
use openmecfs_core::reasoning::create_provider;
use openmecfs_core::sources::EuropePmcClient;
use openmecfs_core::store::{EvidenceStore, JsonFileStore, MemoryStore};
use openmecfs_core::SearchFilters;

/// Open ME/CFS: AI-summarized research evidence tooling
#[derive(Parser, Debug)]
#[command(name = "openmecfs", version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./openmecfs.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch a paper from Europe PMC into the store (idempotent)
    Sync {
        /// PubMed identifier
        pmid: String,
    },
    /// Generate (or return the cached) evidence record for a paper
    Evidence { pmid: String },
    /// Synthesize causal hypotheses across the evidence corpus
    Synthesize,
    /// Full-text search over the paper snapshot
    Search {
        query: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Import a summarized-papers JSON dataset
    Import { file: PathBuf },
    /// Dataset statistics
    Stats,
    /// Mechanism/biomarker graph over recent evidence
    Graph {
        #[arg(long, default_value = "200")]
        limit: usize,
    },
    /// Most frequent biomarkers across the evidence corpus
    Biomarkers {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Clear the search result cache (privileged)
    ClearCache {
        /// Admin token; must match the configured secret when one is set
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .init();

    let config = PlatformConfig::load(cli.config.as_deref())?;

    let store: Arc<dyn EvidenceStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        _ => Arc::new(JsonFileStore::open(&config.store.path)?),
    };
    let reasoning = create_provider(&config.reasoning)?;
    let embedder = create_embedder(&config.embedding);
    let sources = Arc::new(EuropePmcClient::from_config(&config.sources)?);
    let engine = EvidenceEngine::new(store, reasoning, embedder, sources, config);

    match cli.command {
        Commands::Sync { pmid } => {
            let paper = engine.sync_paper(&pmid).await?;
            print_json(&paper)?;
        }
        Commands::Evidence { pmid } => {
            let outcome = engine.generate_evidence(&pmid).await?;
            let status = if outcome.was_cached() { "cached" } else { "generated" };
            tracing::info!(pmid = %pmid, status, "evidence ready");
            print_json(outcome.record())?;
        }
        Commands::Synthesize => {
            let merged = engine.synthesize_hypotheses().await?;
            print_json(&merged)?;
        }
        Commands::Search {
            query,
            author,
            year,
            limit,
        } => {
            let filters = SearchFilters { author, year };
            let results = engine.cached_search(Some(&query), &filters, limit).await?;
            print_json(&results)?;
        }
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let rows = parse_dataset(&json)?;
            let imported = engine.import_dataset(rows).await?;
            println!("imported {imported} papers");
        }
        Commands::Stats => {
            let stats = engine.stats().await?;
            print_json(&stats)?;
        }
        Commands::Graph { limit } => {
            let graph = engine.mechanism_graph(limit).await?;
            print_json(&graph)?;
        }
        Commands::Biomarkers { limit } => {
            let counts = engine.top_biomarkers(limit).await?;
            for (biomarker, count) in counts {
                println!("{count:>5}  {biomarker}");
            }
        }
        Commands::ClearCache { token } => {
            engine.clear_cache(token.as_deref())?;
            println!("search cache cleared");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
