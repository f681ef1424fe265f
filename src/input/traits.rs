//! Task source trait and error types

use crate::input::types::TaskInputs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading crawl inputs
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path}: missing column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{0}")]
    Unavailable(String),
}

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

/// Supplies the locations, categories and output column order for a run
///
/// A failure here aborts the run before any network activity.
pub trait TaskSource {
    fn load(&self) -> InputResult<TaskInputs>;
}

/// Task source over values already in memory
#[derive(Debug, Clone, Default)]
pub struct StaticTaskSource {
    inputs: TaskInputs,
}

impl StaticTaskSource {
    pub fn new(inputs: TaskInputs) -> Self {
        Self { inputs }
    }
}

impl TaskSource for StaticTaskSource {
    fn load(&self) -> InputResult<TaskInputs> {
        Ok(self.inputs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Category, Location};

    #[test]
    fn test_static_source_returns_inputs() {
        let inputs = TaskInputs {
            locations: vec![Location::new(28.6, 77.2)],
            categories: vec![Category::new("Dairy", "14", "Milk", "922")],
            output_fields: vec!["date".to_string()],
        };
        let source = StaticTaskSource::new(inputs.clone());

        let loaded = source.load().unwrap();
        assert_eq!(loaded, inputs);
        assert_eq!(loaded.task_count(), 1);
    }

    #[test]
    fn test_error_messages_name_the_file() {
        let err = InputError::MissingColumn {
            path: PathBuf::from("locations.csv"),
            column: "latitude".to_string(),
        };
        assert_eq!(err.to_string(), "locations.csv: missing column 'latitude'");

        let err = InputError::Malformed {
            path: PathBuf::from("locations.csv"),
            line: 3,
            message: "invalid latitude 'north'".to_string(),
        };
        assert_eq!(err.to_string(), "locations.csv:3: invalid latitude 'north'");
    }
}
