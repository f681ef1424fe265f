//! CSV sink
//!
//! Writes a header row in schema order followed by one line per record.
//! Null cells are empty; booleans are `true`/`false`; nested JSON values are
//! written as compact JSON text.

use crate::output::projector::{ProjectedOutput, ProjectedRows};
use crate::output::traits::{RecordSink, SinkError, SinkResult};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sink writing projected rows to a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a sink after checking that the target directory exists
    ///
    /// The file itself is only created by `write`.
    pub fn open(path: impl Into<PathBuf>) -> SinkResult<Self> {
        let sink = Self::new(path);
        let parent = match sink.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(SinkError::Write(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    /// On `NoData` nothing is written and no file is created
    fn write(&mut self, output: &ProjectedOutput) -> SinkResult<()> {
        let ProjectedOutput::Rows(rows) = output else {
            tracing::info!("No rows to write to {}", self.path.display());
            return Ok(());
        };

        let mut writer = BufWriter::new(File::create(&self.path)?);
        writer.write_all(format_csv(rows).as_bytes())?;
        writer.flush()?;

        tracing::info!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

/// Formats projected rows as CSV text
pub fn format_csv(rows: &ProjectedRows) -> String {
    let mut csv = String::new();

    let header: Vec<String> = rows.columns.iter().map(|c| escape(c)).collect();
    csv.push_str(&header.join(","));
    csv.push('\n');

    for row in &rows.rows {
        let cells: Vec<String> = row.iter().map(format_cell).collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }

    csv
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => escape(text),
        nested => escape(&nested.to_string()),
    }
}

fn escape(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
