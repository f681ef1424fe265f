//! Task source backed by three comma-separated files
//!
//! - locations: header with `latitude` and `longitude`
//! - categories: header with `l1_category`, `l1_category_id`, `l2_category`,
//!   `l2_category_id`
//! - schema: some leading rows to skip, then a header row containing the
//!   field-name column; every non-empty value in that column is an output
//!   column, in file order

use crate::config::InputConfig;
use crate::input::table::{parse_table, TableRow};
use crate::input::traits::{InputError, InputResult, TaskSource};
use crate::input::types::{Category, Location, TaskInputs};
use std::path::{Path, PathBuf};

/// Reads crawl inputs from CSV files on disk
#[derive(Debug, Clone)]
pub struct CsvTaskSource {
    locations_path: PathBuf,
    categories_path: PathBuf,
    schema_path: PathBuf,
    schema_skip_rows: usize,
    schema_field_column: String,
}

impl CsvTaskSource {
    /// Creates a source with the default schema layout (one leading row
    /// skipped, field names under `Field`)
    pub fn new(
        locations_path: impl Into<PathBuf>,
        categories_path: impl Into<PathBuf>,
        schema_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            locations_path: locations_path.into(),
            categories_path: categories_path.into(),
            schema_path: schema_path.into(),
            schema_skip_rows: 1,
            schema_field_column: "Field".to_string(),
        }
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self::new(
            &config.locations_path,
            &config.categories_path,
            &config.schema_path,
        )
        .with_schema_layout(config.schema_skip_rows, &config.schema_field_column)
    }

    /// Overrides how the schema file is laid out
    pub fn with_schema_layout(mut self, skip_rows: usize, field_column: &str) -> Self {
        self.schema_skip_rows = skip_rows;
        self.schema_field_column = field_column.to_string();
        self
    }

    fn load_locations(&self) -> InputResult<Vec<Location>> {
        let path = &self.locations_path;
        let (header, rows) = split_header(path, read_table(path)?)?;
        let lat = require_column(path, &header, "latitude")?;
        let lon = require_column(path, &header, "longitude")?;

        rows.iter()
            .map(|row| {
                Ok(Location::new(
                    parse_coordinate(path, row, lat, "latitude")?,
                    parse_coordinate(path, row, lon, "longitude")?,
                ))
            })
            .collect()
    }

    fn load_categories(&self) -> InputResult<Vec<Category>> {
        let path = &self.categories_path;
        let (header, rows) = split_header(path, read_table(path)?)?;
        let l1_name = require_column(path, &header, "l1_category")?;
        let l1_id = require_column(path, &header, "l1_category_id")?;
        let l2_name = require_column(path, &header, "l2_category")?;
        let l2_id = require_column(path, &header, "l2_category_id")?;

        Ok(rows
            .iter()
            .map(|row| {
                Category::new(
                    row.get(l1_name),
                    row.get(l1_id),
                    row.get(l2_name),
                    row.get(l2_id),
                )
            })
            .collect())
    }

    fn load_output_fields(&self) -> InputResult<Vec<String>> {
        let path = &self.schema_path;
        let rows: Vec<TableRow> = read_table(path)?
            .into_iter()
            .skip(self.schema_skip_rows)
            .collect();
        let (header, rows) = split_header(path, rows)?;
        let column = require_column(path, &header, &self.schema_field_column)?;

        Ok(rows
            .iter()
            .map(|row| row.get(column))
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl TaskSource for CsvTaskSource {
    fn load(&self) -> InputResult<TaskInputs> {
        Ok(TaskInputs {
            locations: self.load_locations()?,
            categories: self.load_categories()?,
            output_fields: self.load_output_fields()?,
        })
    }
}

fn read_table(path: &Path) -> InputResult<Vec<TableRow>> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_table(&text).map_err(|e| InputError::Malformed {
        path: path.to_path_buf(),
        line: e.line,
        message: e.message,
    })
}

fn split_header(path: &Path, mut rows: Vec<TableRow>) -> InputResult<(TableRow, Vec<TableRow>)> {
    if rows.is_empty() {
        return Err(InputError::Malformed {
            path: path.to_path_buf(),
            line: 1,
            message: "missing header row".to_string(),
        });
    }
    let header = rows.remove(0);
    Ok((header, rows))
}

fn require_column(path: &Path, header: &TableRow, name: &str) -> InputResult<usize> {
    header.position(name).ok_or_else(|| InputError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    })
}

fn parse_coordinate(path: &Path, row: &TableRow, index: usize, name: &str) -> InputResult<f64> {
    let raw = row.get(index);
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::Malformed {
            path: path.to_path_buf(),
            line: row.line,
            message: format!("invalid {} '{}'", name, raw),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOCATIONS: &str = "latitude,longitude\n28.6139,77.209\n19.076,72.8777\n";
    const CATEGORIES: &str = "l1_category,l1_category_id,l2_category,l2_category_id\n\
        Dairy & Breakfast,14,Milk,922\n\
        \"Fruits, Vegetables\",1487,Fresh Fruits,1489\n";
    const SCHEMA: &str =
        "Scraping Task,,\nField,Type,Notes\ndate,date,\nvariant_id,int,\nbrand,str,\n";

    fn write_inputs(
        dir: &TempDir,
        locations: &str,
        categories: &str,
        schema: &str,
    ) -> CsvTaskSource {
        let loc = dir.path().join("locations.csv");
        let cat = dir.path().join("categories.csv");
        let sch = dir.path().join("schema.csv");
        std::fs::write(&loc, locations).unwrap();
        std::fs::write(&cat, categories).unwrap();
        std::fs::write(&sch, schema).unwrap();
        CsvTaskSource::new(loc, cat, sch)
    }

    #[test]
    fn test_load_all_inputs() {
        let dir = TempDir::new().unwrap();
        let source = write_inputs(&dir, LOCATIONS, CATEGORIES, SCHEMA);

        let inputs = source.load().unwrap();

        assert_eq!(
            inputs.locations,
            vec![Location::new(28.6139, 77.209), Location::new(19.076, 72.8777)]
        );
        assert_eq!(inputs.categories.len(), 2);
        assert_eq!(inputs.categories[0].l1_name, "Dairy & Breakfast");
        assert_eq!(inputs.categories[1].l1_name, "Fruits, Vegetables");
        assert_eq!(inputs.categories[1].l2_id, "1489");
        assert_eq!(inputs.output_fields, vec!["date", "variant_id", "brand"]);
        assert_eq!(inputs.task_count(), 4);
    }

    #[test]
    fn test_schema_layout_override() {
        let dir = TempDir::new().unwrap();
        let source = write_inputs(&dir, LOCATIONS, CATEGORIES, "Column\nmrp\nin_stock\n")
            .with_schema_layout(0, "Column");

        let inputs = source.load().unwrap();
        assert_eq!(inputs.output_fields, vec!["mrp", "in_stock"]);
    }

    #[test]
    fn test_missing_file() {
        let source = CsvTaskSource::new(
            "/nonexistent/l.csv",
            "/nonexistent/c.csv",
            "/nonexistent/s.csv",
        );
        assert!(matches!(source.load(), Err(InputError::Io { .. })));
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        let source = write_inputs(&dir, "lat,lon\n1,2\n", CATEGORIES, SCHEMA);

        match source.load() {
            Err(InputError::MissingColumn { column, .. }) => assert_eq!(column, "latitude"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_coordinate_names_line() {
        let dir = TempDir::new().unwrap();
        let locations = "latitude,longitude\n1.0,2.0\nnorth,3.0\n";
        let source = write_inputs(&dir, locations, CATEGORIES, SCHEMA);

        match source.load() {
            Err(InputError::Malformed { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("north"));
            }
            other => panic!("expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_schema_file() {
        let dir = TempDir::new().unwrap();
        let source = write_inputs(&dir, LOCATIONS, CATEGORIES, "");
        assert!(matches!(source.load(), Err(InputError::Malformed { .. })));
    }
}
