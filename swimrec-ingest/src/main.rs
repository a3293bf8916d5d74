//! swimrec-ingest - swim record candidate ingest
//!
//! Reads a batch of scraped candidates (JSON array or JSON Lines) from a file
//! or stdin, converges it into the canonical record store and prints the run
//! summary as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use swimrec_ingest::db;
use swimrec_ingest::models::parse_candidates;
use swimrec_ingest::{IngestConfig, IngestPipeline};

#[derive(Parser, Debug)]
#[command(name = "swimrec-ingest")]
#[command(about = "Converge scraped swim record candidates into canonical records")]
struct Args {
    /// Candidate batch file; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// Root folder holding swimrec.db (overrides env and config file)
    #[arg(short, long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before the subscriber exists since it supplies the log level;
    // where the settings came from is logged once tracing is up.
    let config = IngestConfig::load(args.root_folder.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting swimrec-ingest v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config.config_file {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    for applied in &config.env_overrides {
        info!("Environment override: {}", applied);
    }
    info!(
        max_insert_attempts = config.max_insert_attempts,
        max_lock_wait_ms = config.max_lock_wait_ms,
        max_error_samples = config.max_error_samples,
        "Effective ingest settings"
    );

    let text = read_input(args.input.as_ref()).await?;
    let candidates = parse_candidates(&text).context("Failed to parse candidate batch")?;
    info!("Loaded {} candidates", candidates.len());

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let pool = db::init_database_pool(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after current candidate");
            ctrl_c_token.cancel();
        }
    });

    let pipeline = IngestPipeline::new(pool.clone(), &config);
    let summary = match pipeline.run_with_cancel(candidates, &cancel).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Ingest run aborted: {}", e);
            pool.close().await;
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    pool.close().await;

    Ok(())
}

async fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
