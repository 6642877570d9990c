//! Alumnyx: alumni career-history cleaning and semantic indexing.
//! Entry point for the `alumnyx` binary.

mod config;

use std::path::PathBuf;

use alumnyx_ingestion::clean_companies;
use alumnyx_ingestion::document::DocumentComposer;
use alumnyx_ingestion::embedding::{EmbeddingClient, ZeroEmbedder};
use alumnyx_ingestion::index::{InMemoryIndex, PineconeIndex};
use alumnyx_ingestion::loader::{load_alumni, prepare_records};
use alumnyx_ingestion::normalise::clean_company_entry;
use alumnyx_ingestion::pipeline::{run_ingestion, IngestionJob, IngestionProgress, IngestionResult};
use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "alumnyx", version, about = "Clean alumni career histories and index them for semantic search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean, embed and upsert every record of the alumni export.
    Ingest {
        /// Alumni export JSON (defaults to `data.path` from the config).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Target namespace (defaults to `index.namespace`).
        #[arg(long)]
        namespace: Option<String>,
        /// Use zero vectors and an in-memory index; no network calls.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the cleaned label for each raw entry, then the deduplicated list.
    Clean {
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Print composed documents for the first records of the export.
    Preview {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialise structured logging; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("alumnyx=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Ingest { input, namespace, dry_run } => ingest(input, namespace, dry_run).await,
        Command::Clean { entries } => {
            clean(&entries);
            Ok(())
        }
        Command::Preview { input, limit } => preview(input, limit),
    }
}

async fn ingest(input: Option<PathBuf>, namespace: Option<String>, dry_run: bool) -> anyhow::Result<()> {
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    let config = config::Config::load()?;
    let secrets = config::Secrets::from_env();

    let path = input.unwrap_or_else(|| PathBuf::from(&config.data.path));
    let records = load_alumni(&path)?;

    let job = IngestionJob {
        namespace: namespace.unwrap_or_else(|| config.index.namespace.clone()),
        batch_size: config.embedding.batch_size,
        affiliation: config.document.affiliation.clone(),
    };

    let (tx, rx) = broadcast::channel(64);
    let bar_task = spawn_progress_bar(rx);

    let result = if dry_run {
        info!("Dry run: zero vectors, in-memory index");
        let index = InMemoryIndex::new();
        let embedder = ZeroEmbedder::new(config.embedding.dim);
        run_ingestion(&job, &records, &embedder, &index, Some(tx)).await
    } else {
        let host = config.index_host()
            .context("index.host is not configured (set it in alumnyx.toml or PINECONE_INDEX_HOST)")?;
        let pinecone_key = secrets.pinecone_api_key
            .context("PINECONE_API_KEY is not set")?;
        let index = PineconeIndex::new(&host, pinecone_key)?;
        let embedder = EmbeddingClient::new(config.embedding_config(secrets.openai_api_key))?;
        info!(
            backend = ?embedder.config().backend,
            model = %embedder.config().model,
            "Embedding enabled"
        );
        run_ingestion(&job, &records, &embedder, &index, Some(tx)).await
    };

    finish_progress_bar(bar_task).await;
    report(&result)
}

fn report(result: &IngestionResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    if result.batches_failed > 0 {
        anyhow::bail!(
            "{} of {} batches failed; namespace `{}` is incomplete",
            result.batches_failed, result.batches_total, result.namespace
        );
    }
    info!("Done. Namespace `{}` now contains the cleaned profiles.", result.namespace);
    Ok(())
}

fn spawn_progress_bar(mut rx: broadcast::Receiver<IngestionProgress>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{msg:>10} [{bar:40}] {pos}/{len} batches")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        loop {
            match rx.recv().await {
                Ok(p) => {
                    bar.set_length(p.batches_total as u64);
                    bar.set_position(p.batches_done as u64);
                    bar.set_message(p.stage);
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "Progress events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
        bar.finish();
    })
}

/// Waits for the progress bar; a failed bar task is logged, never fatal.
async fn finish_progress_bar(task: tokio::task::JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Progress bar task failed");
            false
        }
    }
}

fn clean(entries: &[String]) {
    for entry in entries {
        match clean_company_entry(entry) {
            Some(label) => println!("{entry}\t{label}"),
            None => println!("{entry}\t<discarded>"),
        }
    }
    println!("companies: {}", clean_companies(entries).join(", "));
}

fn preview(input: Option<PathBuf>, limit: usize) -> anyhow::Result<()> {
    let config = config::Config::load()?;
    let path = input.unwrap_or_else(|| PathBuf::from(&config.data.path));
    let records = load_alumni(&path)?;
    let composer = DocumentComposer::new(config.document.affiliation.clone());

    for prepared in prepare_records(&records, &composer).iter().take(limit) {
        println!("# {}\n{}\n", prepared.id, prepared.text);
    }
    Ok(())
}
