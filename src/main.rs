//! Shelfscan main entry point
//!
//! This is the command-line interface for the Shelfscan catalog crawler.

use anyhow::{bail, Context};
use clap::Parser;
use shelfscan::config::{load_config_with_hash, Config};
use shelfscan::crawler::crawl;
use shelfscan::input::{CsvTaskSource, TaskSource};
use shelfscan::output::{load_latest_run_from, print_statistics};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelfscan: a catalog listing crawler
///
/// Shelfscan sweeps a catalog listing API across every location and
/// category pair, normalizes the listing items into product records and
/// writes them as CSV in the column order of a schema file.
#[derive(Parser, Debug)]
#[command(name = "shelfscan")]
#[command(version = "1.0.0")]
#[command(about = "A catalog listing crawler", long_about = None)]
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

    /// Validate config and inputs and show the task plan without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run stored in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfscan=info,warn"),
            1 => EnvFilter::new("shelfscan=debug,info"),
            2 => EnvFilter::new("shelfscan=trace,debug"),
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

/// Handles the --dry-run mode: validates config, loads inputs, shows the plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Shelfscan Dry Run ===\n");

    println!("API:");
    println!("  Endpoint: {}", config.api.endpoint_url);
    println!("  User agent: {}", config.api.user_agent);

    println!("\nCrawler Configuration:");
    println!(
        "  Rate-limit cooldown: {}s",
        config.crawler.rate_limit_cooldown_seconds
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_seconds
    );
    let [min_delay, max_delay] = config.crawler.inter_task_delay_range_seconds;
    println!("  Inter-task delay: {}s - {}s", min_delay, max_delay);
    println!("  Max attempts: {}", config.crawler.max_attempts);
    match config.crawler.max_rate_limit_retries {
        Some(limit) => println!("  Max rate-limit retries: {}", limit),
        None => println!("  Max rate-limit retries: unbounded"),
    }

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if let Some(database_path) = &config.output.database_path {
        println!("  Database: {}", database_path);
    }

    let inputs = CsvTaskSource::from_config(&config.input)
        .load()
        .context("Failed to load crawl inputs")?;

    println!("\nLocations ({}):", inputs.locations.len());
    for location in &inputs.locations {
        println!("  - ({}, {})", location.latitude, location.longitude);
    }

    println!("\nCategories ({}):", inputs.categories.len());
    for category in &inputs.categories {
        println!(
            "  - {} [{}] > {} [{}]",
            category.l1_name, category.l1_id, category.l2_name, category.l2_id
        );
    }

    println!("\nOutput columns ({}):", inputs.output_fields.len());
    println!("  {}", inputs.output_fields.join(", "));

    println!("\n✓ Configuration is valid");
    println!("✓ Would run {} tasks", inputs.task_count());

    Ok(())
}

/// Handles the --stats mode: shows statistics of the latest stored run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        bail!("--stats needs output.database-path to be set");
    };

    println!("Database: {}\n", database_path);

    let Some(run) = load_latest_run_from(Path::new(database_path))? else {
        println!("No runs recorded yet");
        return Ok(());
    };

    println!("Run {} ({})", run.id, run.status.to_db_string());
    println!("  Started: {}", run.started_at);
    if let Some(finished_at) = &run.finished_at {
        println!("  Finished: {}", finished_at);
    }
    println!("  Capture date: {}", run.capture_date);
    println!("  Config hash: {}", run.config_hash);
    println!();

    print_statistics(&run.statistics);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!("Starting crawl against {}", config.api.endpoint_url);

    match crawl(config, config_hash).await {
        Ok(statistics) => {
            tracing::info!(
                "Crawl completed: {} tasks, {} records, {} failed",
                statistics.tasks_total,
                statistics.records,
                statistics.tasks_failed()
            );
            println!();
            print_statistics(&statistics);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
