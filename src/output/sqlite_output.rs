//! SQLite sink
//!
//! Records every run (capture date, config hash, column order, outcome
//! counts) and its projected rows. Rows are stored as JSON arrays aligned
//! with the run's column list so the schema order survives.

use crate::output::projector::ProjectedOutput;
use crate::output::stats::CrawlStatistics;
use crate::output::traits::{RecordSink, SinkError, SinkResult};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;

/// SQL schema for the run database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    capture_date TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    columns TEXT NOT NULL DEFAULT '[]',
    tasks_total INTEGER NOT NULL DEFAULT 0,
    tasks_extracted INTEGER NOT NULL DEFAULT 0,
    tasks_no_data INTEGER NOT NULL DEFAULT 0,
    tasks_forbidden INTEGER NOT NULL DEFAULT 0,
    tasks_transient_error INTEGER NOT NULL DEFAULT 0,
    tasks_skipped INTEGER NOT NULL DEFAULT 0,
    rate_limit_cooldowns INTEGER NOT NULL DEFAULT 0,
    records INTEGER NOT NULL DEFAULT 0
);

-- Projected rows, in accumulation order
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    row_json TEXT NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_products_run ON products(run_id);
"#;

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    NoData,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::NoData => "no_data",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "no_data" => Some(Self::NoData),
            _ => None,
        }
    }
}

/// A stored run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub capture_date: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub columns: Vec<String>,
    pub statistics: CrawlStatistics,
}

/// Sink persisting runs and rows to SQLite
pub struct SqliteSink {
    conn: Connection,
    config_hash: String,
    capture_date: NaiveDate,
    run_id: Option<i64>,
    status: RunStatus,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path, config_hash: &str, capture_date: NaiveDate) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        Self::with_connection(conn, config_hash, capture_date)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(config_hash: &str, capture_date: NaiveDate) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, config_hash, capture_date)
    }

    fn with_connection(
        conn: Connection,
        config_hash: &str,
        capture_date: NaiveDate,
    ) -> SinkResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            config_hash: config_hash.to_string(),
            capture_date,
            run_id: None,
            status: RunStatus::Running,
        })
    }

    /// The run this sink is writing, once started
    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    fn ensure_run(&mut self) -> SinkResult<i64> {
        if let Some(run_id) = self.run_id {
            return Ok(run_id);
        }

        self.conn.execute(
            "INSERT INTO runs (started_at, capture_date, config_hash, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Utc::now().to_rfc3339(),
                self.capture_date.format("%Y-%m-%d").to_string(),
                self.config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = self.conn.last_insert_rowid();
        self.run_id = Some(run_id);
        Ok(run_id)
    }

    /// Most recent run in the database
    pub fn latest_run(&self) -> SinkResult<Option<RunRecord>> {
        load_latest_run(&self.conn)
    }

    /// Rows stored for `run_id`, in the order they were written
    pub fn load_rows(&self, run_id: i64) -> SinkResult<Vec<Vec<Value>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT row_json FROM products WHERE run_id = ?1 ORDER BY position")?;
        let raw = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        raw.iter()
            .map(|json| {
                serde_json::from_str(json).map_err(|e| SinkError::Format(e.to_string()))
            })
            .collect()
    }
}

impl RecordSink for SqliteSink {
    fn write(&mut self, output: &ProjectedOutput) -> SinkResult<()> {
        let run_id = self.ensure_run()?;

        let ProjectedOutput::Rows(rows) = output else {
            self.status = RunStatus::NoData;
            self.conn.execute(
                "UPDATE runs SET status = ?1 WHERE id = ?2",
                params![self.status.to_db_string(), run_id],
            )?;
            return Ok(());
        };

        let columns = serde_json::to_string(&rows.columns)
            .map_err(|e| SinkError::Format(e.to_string()))?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE runs SET columns = ?1 WHERE id = ?2",
            params![columns, run_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (run_id, position, row_json) VALUES (?1, ?2, ?3)",
            )?;
            for (position, row) in rows.rows.iter().enumerate() {
                let json =
                    serde_json::to_string(row).map_err(|e| SinkError::Format(e.to_string()))?;
                stmt.execute(params![run_id, position as i64, json])?;
            }
        }
        tx.commit()?;

        tracing::info!("Stored {} rows under run {}", rows.len(), run_id);
        Ok(())
    }

    fn finalize(&mut self, statistics: &CrawlStatistics) -> SinkResult<()> {
        let run_id = self.ensure_run()?;
        if self.status == RunStatus::Running {
            self.status = RunStatus::Completed;
        }

        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, tasks_total = ?3, tasks_extracted = ?4,
                tasks_no_data = ?5, tasks_forbidden = ?6, tasks_transient_error = ?7,
                tasks_skipped = ?8, rate_limit_cooldowns = ?9, records = ?10
             WHERE id = ?11",
            params![
                Utc::now().to_rfc3339(),
                self.status.to_db_string(),
                statistics.tasks_total as i64,
                statistics.tasks_extracted as i64,
                statistics.tasks_no_data as i64,
                statistics.tasks_forbidden as i64,
                statistics.tasks_transient_error as i64,
                statistics.tasks_skipped as i64,
                statistics.rate_limit_cooldowns as i64,
                statistics.records as i64,
                run_id
            ],
        )?;
        Ok(())
    }
}

/// Opens the database at `path` and returns its most recent run
pub fn load_latest_run_from(path: &Path) -> SinkResult<Option<RunRecord>> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA_SQL)?;
    load_latest_run(&conn)
}

fn load_latest_run(conn: &Connection) -> SinkResult<Option<RunRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, started_at, finished_at, capture_date, config_hash, status, columns,
                tasks_total, tasks_extracted, tasks_no_data, tasks_forbidden,
                tasks_transient_error, tasks_skipped, rate_limit_cooldowns, records
         FROM runs ORDER BY id DESC LIMIT 1",
    )?;

    let run = stmt.query_row([], run_from_row).optional()?;
    Ok(run)
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let columns: String = row.get(6)?;
    let count = |index: usize| row.get::<_, i64>(index).map(|value| value.max(0) as u64);

    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        capture_date: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        columns: serde_json::from_str(&columns).unwrap_or_default(),
        statistics: CrawlStatistics {
            tasks_total: count(7)?,
            tasks_extracted: count(8)?,
            tasks_no_data: count(9)?,
            tasks_forbidden: count(10)?,
            tasks_transient_error: count(11)?,
            tasks_skipped: count(12)?,
            rate_limit_cooldowns: count(13)?,
            records: count(14)?,
        },
    })
}
