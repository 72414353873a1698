//! goveq: scan 8-K filings for government equity investment disclosures.
//!
//! Exit codes: 0 ok, 1 configuration/state error, 2 source error, 3 notification error.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gov_equity_notifier::config::ENV_CONFIG_PATH;
use gov_equity_notifier::dictionary::ENV_DICTIONARY_PATH;
use gov_equity_notifier::ingest::directory::DirectorySource;
use gov_equity_notifier::ingest::types::FilingSource;
use gov_equity_notifier::notify::{notify_all, LogNotifier, Notifier, OutboxNotifier};
use gov_equity_notifier::store::{DEFAULT_STATE_PATH, ENV_STATE_PATH};
use gov_equity_notifier::text::filing_text;
use gov_equity_notifier::{
    run_scan, AlertDigest, Classifier, ClassifierConfig, Dictionary, Document, SeenStore,
};

const DEFAULT_LOG_FILTER: &str = "gov_equity_notifier=info,goveq=info,classifier=info,notify=info,warn";

#[derive(Parser)]
#[command(name = "goveq")]
#[command(about = "Flag government equity investments disclosed in 8-K filings")]
struct Cli {
    /// Classifier config (TOML)
    #[arg(long, global = true, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    /// Dictionary tables (TOML); built-in tables when absent
    #[arg(long, global = true, env = ENV_DICTIONARY_PATH)]
    dictionary: Option<PathBuf>,

    /// Seen-filing state file
    #[arg(long, global = true, env = ENV_STATE_PATH, default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one filing and print the verdict as JSON
    Classify {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identifier reported in logs (defaults to the file stem)
        #[arg(long)]
        source_id: Option<String>,
    },
    /// Scan a directory of filings, print the alert digest and record hits
    Scan {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Also write the digest into this directory
        #[arg(long, env = "GOVEQ_OUTBOX_DIR")]
        outbox: Option<PathBuf>,

        /// Digest date (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show processed and high-confidence counts
    Status,
    /// Forget every recorded filing
    Clear {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0:#}")]
    Config(anyhow::Error),
    #[error("source: {0:#}")]
    Source(anyhow::Error),
    #[error("notification: {0:#}")]
    Notify(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => 1,
            CliError::Source(_) => 2,
            CliError::Notify(_) => 3,
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
/// GOVEQ_LOG_FORMAT=json switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("GOVEQ_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<ClassifierConfig, CliError> {
    match &cli.config {
        Some(p) => ClassifierConfig::from_path(p),
        None => ClassifierConfig::from_toml(),
    }
    .map_err(|e| CliError::Config(e.into()))
}

fn load_classifier(cli: &Cli) -> Result<Classifier, CliError> {
    let config = load_config(cli)?;
    let dictionary = match &cli.dictionary {
        Some(p) => Dictionary::from_path(p),
        None => Dictionary::load_default(),
    }
    .map_err(|e| CliError::Config(e.into()))?;
    Ok(Classifier::new(Arc::new(dictionary), config))
}

async fn open_store(cli: &Cli) -> Result<SeenStore, CliError> {
    SeenStore::open(&cli.state).await.map_err(CliError::Config)
}

async fn cmd_classify(cli: &Cli, file: &Path, source_id: Option<&str>) -> Result<(), CliError> {
    let classifier = load_classifier(cli)?;
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("read {}", file.display()))
        .map_err(CliError::Source)?;
    let id = source_id.map(str::to_string).unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    });
    let doc = Document::new(id, filing_text(&String::from_utf8_lossy(&raw)));
    let verdict = classifier.classify(&doc);
    let out = serde_json::to_string_pretty(&verdict)
        .context("serialize verdict")
        .map_err(CliError::Config)?;
    println!("{out}");
    Ok(())
}

async fn cmd_scan(
    cli: &Cli,
    dir: &Path,
    outbox: Option<&Path>,
    date: Option<NaiveDate>,
) -> Result<(), CliError> {
    let classifier = load_classifier(cli)?;
    if !dir.is_dir() {
        return Err(CliError::Source(anyhow::anyhow!(
            "{} is not a directory",
            dir.display()
        )));
    }
    let mut store = open_store(cli).await?;

    let sources: Vec<Box<dyn FilingSource>> = vec![Box::new(DirectorySource::new(dir))];
    let report = run_scan(&sources, &mut store, &classifier).await;
    tracing::info!(
        fetched = report.fetched,
        hits = report.hits.len(),
        skipped_seen = report.skipped_seen,
        below_threshold = report.below_threshold,
        "scan finished"
    );
    if report.source_errors == sources.len() {
        return Err(CliError::Source(anyhow::anyhow!("every source failed")));
    }

    store.save().await.map_err(CliError::Config)?;

    if report.hits.is_empty() {
        tracing::info!("no new government equity hits");
        return Ok(());
    }

    let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let digest = AlertDigest::build(
        &report.hits,
        date,
        classifier.config().thresholds().high(),
    );
    println!("{}\n\n{}", digest.subject, digest.body);

    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];
    if let Some(dir) = outbox {
        notifiers.push(Box::new(OutboxNotifier::new(dir)));
    }
    notify_all(&notifiers, &digest)
        .await
        .map_err(CliError::Notify)
}

async fn cmd_status(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let store = open_store(cli).await?;
    let stats = store.stats(config.thresholds().high());
    println!("processed: {}", stats.processed);
    println!("high-confidence: {}", stats.high_confidence);
    Ok(())
}

async fn cmd_clear(cli: &Cli, yes: bool) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::Config(anyhow::anyhow!(
            "refusing to clear {} without --yes",
            cli.state.display()
        )));
    }
    SeenStore::reset(&cli.state)
        .await
        .map_err(CliError::Config)?;
    tracing::info!(path = %cli.state.display(), "seen store cleared");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let res = match &cli.command {
        Commands::Classify { file, source_id } => {
            cmd_classify(&cli, file, source_id.as_deref()).await
        }
        Commands::Scan { dir, outbox, date } => {
            cmd_scan(&cli, dir, outbox.as_deref(), *date).await
        }
        Commands::Status => cmd_status(&cli).await,
        Commands::Clear { yes } => cmd_clear(&cli, *yes).await,
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("goveq: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
