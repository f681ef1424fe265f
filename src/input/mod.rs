//! Input module: where crawl tasks come from
//!
//! This module handles:
//! - The `TaskSource` seam that supplies locations, categories and the
//!   output column order
//! - A CSV-file implementation of it
//! - An in-memory implementation for tests and embedding

mod csv_source;
mod table;
mod traits;
mod types;

pub use csv_source::CsvTaskSource;
pub use traits::{InputError, InputResult, StaticTaskSource, TaskSource};
pub use types::{Category, CrawlTask, Location, TaskInputs};
