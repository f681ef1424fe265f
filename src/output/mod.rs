//! Output module: from accumulated records to persisted rows
//!
//! This module handles:
//! - Projecting records onto the externally supplied column order
//! - The `RecordSink` seam and its CSV, SQLite and in-memory implementations
//! - Run statistics

mod csv_output;
mod projector;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{format_csv, CsvSink};
pub use projector::{project, ProjectedOutput, ProjectedRows};
pub use sqlite_output::{load_latest_run_from, RunRecord, RunStatus, SqliteSink};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{MemorySink, RecordSink, SinkError, SinkResult};

/// Hands `output` to every sink, then finalizes each with `statistics`
///
/// Stops at the first sink that fails.
pub fn deliver(
    output: &ProjectedOutput,
    statistics: &CrawlStatistics,
    sinks: &mut [Box<dyn RecordSink>],
) -> SinkResult<()> {
    for sink in sinks.iter_mut() {
        sink.write(output)?;
        sink.finalize(statistics)?;
    }
    Ok(())
}
