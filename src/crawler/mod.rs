//! Crawler module: from a task list to accumulated product records
//!
//! This module contains the core crawling logic, including:
//! - Per-task request context (headers and query)
//! - The retry state machine around a single listing request
//! - Inter-task pacing and the sleep seam
//! - Payload normalization into product records
//! - Overall crawl orchestration

mod coordinator;
mod executor;
mod normalizer;
mod pacing;
mod request;
mod settings;

pub use coordinator::{CrawlOrchestrator, CrawlReport};
pub use executor::{build_http_client, FetchReport, RetryExecutor};
pub use normalizer::{listing_items, Normalized, ResponseNormalizer};
pub use pacing::{DelayRange, RecordingSleeper, Sleeper, TokioSleeper};
pub use request::{
    category_slug, coordinate_text, RequestContext, RequestContextBuilder, RequestContextError,
    QUERY_L0, QUERY_L1,
};
pub use settings::CrawlerSettings;

use crate::config::Config;
use crate::input::CsvTaskSource;
use crate::output::{deliver, CrawlStatistics, CsvSink, RecordSink, SqliteSink};
use crate::ShelfError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build crawler settings from the configuration
/// 2. Open the CSV sink and, if configured, the SQLite sink
/// 3. Load locations, categories and the output schema
/// 4. Run every task in location-major order
/// 5. Project the records onto the schema's column order and hand the
///    projection to every sink
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The run finished; individual tasks may still have failed
/// * `Err(ShelfError)` - A sink could not be opened, inputs were unavailable
///   or output could not be written
pub async fn crawl(config: &Config, config_hash: &str) -> Result<CrawlStatistics, ShelfError> {
    let settings = CrawlerSettings::from_config(config)?;
    let source = CsvTaskSource::from_config(&config.input);
    let mut orchestrator = CrawlOrchestrator::new(&settings)?;

    // Every sink is opened before the first request
    let mut sinks: Vec<Box<dyn RecordSink>> =
        vec![Box::new(CsvSink::open(&config.output.csv_path)?)];
    if let Some(database_path) = &config.output.database_path {
        sinks.push(Box::new(SqliteSink::open(
            Path::new(database_path),
            config_hash,
            orchestrator.capture_date(),
        )?));
    }

    let report = orchestrator.run(&source).await?;
    let output = report.project();

    deliver(&output, &report.statistics, &mut sinks)?;

    if output.row_count() == 0 {
        tracing::warn!("No data was scraped");
    } else {
        tracing::info!(
            "Total records: {} written to {}",
            output.row_count(),
            config.output.csv_path
        );
    }

    Ok(report.statistics)
}
