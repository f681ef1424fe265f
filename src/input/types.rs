//! Crawl input types

/// A geographic point the catalog is queried from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A two-level catalog category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub l1_name: String,
    pub l1_id: String,
    pub l2_name: String,
    pub l2_id: String,
}

impl Category {
    pub fn new(
        l1_name: impl Into<String>,
        l1_id: impl Into<String>,
        l2_name: impl Into<String>,
        l2_id: impl Into<String>,
    ) -> Self {
        Self {
            l1_name: l1_name.into(),
            l1_id: l1_id.into(),
            l2_name: l2_name.into(),
            l2_id: l2_id.into(),
        }
    }
}

/// One unit of crawl work
///
/// Built by the orchestrator for every (location, category) pair and
/// dropped as soon as the task finishes.
#[derive(Debug, Clone, Copy)]
pub struct CrawlTask<'a> {
    pub location: &'a Location,
    pub category: &'a Category,
}

/// Everything a task source supplies for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInputs {
    pub locations: Vec<Location>,
    pub categories: Vec<Category>,

    /// Output column order
    pub output_fields: Vec<String>,
}

impl TaskInputs {
    /// Number of tasks the cross product will produce
    pub fn task_count(&self) -> usize {
        self.locations.len() * self.categories.len()
    }
}
