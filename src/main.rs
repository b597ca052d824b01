//! PyPI Harvester main entry point
//!
//! Command-line interface for the resumable package-index scraper.

use clap::Parser;
use pypi_harvester::config::load_config;
use pypi_harvester::engine::CrawlEngine;
use pypi_harvester::sink::SqliteSink;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// PyPI Harvester: a resumable package-index scraper
///
/// Walks the PyPI search index page by page, extracts project metadata,
/// enriches records with GitHub repository statistics, and persists the
/// results to SQLite. Progress is checkpointed after every page so an
/// interrupted run resumes where it left off.
#[derive(Parser, Debug)]
#[command(name = "pypi-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable package-index scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring any saved checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pypi_harvester=info,warn"),
            1 => EnvFilter::new("pypi_harvester=debug,info"),
            2 => EnvFilter::new("pypi_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &pypi_harvester::config::Config) {
    println!("=== PyPI Harvester Dry Run ===\n");

    println!("Harvester Configuration:");
    println!("  Search URL: {}", config.harvester.search_url);
    println!("  Index base URL: {}", config.harvester.index_base_url);
    println!(
        "  Request timeout: {}s",
        config.harvester.request_timeout_secs
    );
    println!("  Retry attempts: {}", config.harvester.retry_attempts);
    println!(
        "  Rate limit: {} calls / {}s",
        config.harvester.rate_limit_calls, config.harvester.rate_limit_period_secs
    );
    println!(
        "  Jitter range: {}-{}s",
        config.harvester.jitter_min_secs, config.harvester.jitter_max_secs
    );
    println!("  Cache expiry: {}s", config.harvester.cache_expiry_secs);

    println!("\nGitHub API:");
    println!("  Base URL: {}", config.github.api_base_url);
    let has_token = config.github.token.is_some() || std::env::var("GITHUB_TOKEN").is_ok();
    println!(
        "  Token: {}",
        if has_token { "configured" } else { "none (unauthenticated)" }
    );
    println!(
        "  Rate limit: {} calls / {}s",
        if has_token {
            config.github.rate_limit_calls_authenticated
        } else {
            config.github.rate_limit_calls_unauthenticated
        },
        config.github.rate_limit_period_secs
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: pypi_harvester::config::Config,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring saved checkpoint)");
    } else {
        tracing::info!("Starting crawl (will resume from checkpoint if present)");
    }

    let sink = match SqliteSink::new(Path::new(&config.output.database_path)) {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let mut engine = CrawlEngine::new(config, sink, fresh)?;

    match engine.run().await {
        Ok(()) => {
            tracing::info!("Harvest completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
