//! Shelfscan: a catalog listing crawler
//!
//! This crate sweeps a catalog listing API across every (location, category)
//! pair, normalizes the returned listing items into flat product records and
//! hands them to a tabular sink in a caller-chosen column order.

pub mod config;
pub mod crawler;
pub mod input;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Shelfscan operations
///
/// Only run-level failures surface here. A single task's HTTP failure is
/// recorded as a [`state::TaskOutcome`] and never aborts the run.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input unavailable: {0}")]
    InputUnavailable(#[from] input::InputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Shelfscan operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlerSettings};
pub use input::{Category, Location, TaskSource};
pub use output::{project, ProjectedOutput, RecordSink};
pub use record::ProductRecord;
pub use state::{AttemptOutcome, FetchOutcome, TaskOutcome};
