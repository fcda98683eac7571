//! `issue-stats` entry point.
//!
//! Runs one reporting pass: resume from the cached archive, aggregate the
//! weeks that have elapsed since, rewrite the report and the archive. Exits
//! non-zero on any failure so the surrounding automation treats the run as
//! "report not updated".

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use issue_stats_core::{SearchClient, StatsConfig, StatsRunner};

#[derive(Debug, Parser)]
#[command(name = "issue-stats", version, about = "Weekly issue statistics report")]
struct Cli {
    /// Log at debug level instead of info.
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (default: ~/.config/issue-stats/config.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured summary archive path.
    #[arg(long, value_name = "PATH")]
    cache_file: Option<PathBuf>,

    /// Override the configured report path.
    #[arg(long, value_name = "PATH")]
    report_file: Option<PathBuf>,

    /// Override the configured repository (owner/name).
    #[arg(long, value_name = "OWNER/REPO")]
    repo: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("issue-stats v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => StatsConfig::load_from_path(path)?,
        None => StatsConfig::load()?,
    };
    if let Some(cache_file) = cli.cache_file {
        config.cache_file = cache_file;
    }
    if let Some(report_file) = cli.report_file {
        config.report_file = report_file;
    }
    if let Some(repo) = cli.repo {
        config.repo = repo;
    }

    let token = std::env::var(&config.token_env)
        .with_context(|| format!("missing auth token: set {}", config.token_env))?;
    let client = SearchClient::with_base_url(token, config.api_base_url.as_str());

    let outcome = StatsRunner::new(config, client).run().await?;
    tracing::info!(
        new_weeks = outcome.new_weeks,
        total_weeks = outcome.total_weeks,
        report = %outcome.report_file.display(),
        "report updated"
    );
    Ok(())
}
