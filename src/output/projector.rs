//! Projection of records onto the output column order

use crate::record::ProductRecord;
use serde_json::Value;

/// Records reindexed to an explicit column order
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRows {
    pub columns: Vec<String>,

    /// One row per record, cells aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl ProjectedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What a run hands to its sinks
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedOutput {
    Rows(ProjectedRows),

    /// The run produced no records at all
    NoData,
}

impl ProjectedOutput {
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::NoData => 0,
        }
    }
}

/// Reindexes `records` to `columns`
///
/// A column that names no canonical field projects to null. No record is
/// dropped. An empty record list yields [`ProjectedOutput::NoData`].
pub fn project(records: &[ProductRecord], columns: &[String]) -> ProjectedOutput {
    if records.is_empty() {
        return ProjectedOutput::NoData;
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.field(column).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    ProjectedOutput::Rows(ProjectedRows {
        columns: columns.to_vec(),
        rows,
    })
}
