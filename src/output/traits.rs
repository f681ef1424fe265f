//! Record sink trait and error types
//!
//! This module defines the trait interface for sinks that persist projected
//! rows, and the errors they can raise.

use crate::output::projector::ProjectedOutput;
use crate::output::stats::CrawlStatistics;
use thiserror::Error;

/// Errors that can occur while persisting output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for a run's projected rows
///
/// The sink decides the persistence format. It receives either rows already
/// ordered by the output schema, or an explicit no-data signal.
pub trait RecordSink {
    /// Persists the run's output
    fn write(&mut self, output: &ProjectedOutput) -> SinkResult<()>;

    /// Called once after `write` with the run's final statistics
    fn finalize(&mut self, statistics: &CrawlStatistics) -> SinkResult<()> {
        let _ = statistics;
        Ok(())
    }
}

/// Sink that keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub outputs: Vec<ProjectedOutput>,
    pub statistics: Option<CrawlStatistics>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, output: &ProjectedOutput) -> SinkResult<()> {
        self.outputs.push(output.clone());
        Ok(())
    }

    fn finalize(&mut self, statistics: &CrawlStatistics) -> SinkResult<()> {
        self.statistics = Some(statistics.clone());
        Ok(())
    }
}
