/// Task outcome definitions for run bookkeeping
use std::fmt;

/// What happened to one (location, category) task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    // ===== Success States =====
    /// Payload normalized into this many records
    Extracted(usize),

    /// Payload had no listing items; not an error
    NoData,

    // ===== Task-Terminal Error States =====
    /// HTTP 403, task abandoned
    Forbidden(String),

    /// Non-429 failure, task abandoned on first occurrence
    TransientError(String),

    // ===== Precondition Failures =====
    /// Task could not be built (e.g. empty category identifier)
    Skipped(String),
}

impl TaskOutcome {
    /// Number of records this task contributed
    pub fn record_count(&self) -> usize {
        match self {
            Self::Extracted(count) => *count,
            _ => 0,
        }
    }

    /// Short label used in logs and statistics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Extracted(_) => "extracted",
            Self::NoData => "no_data",
            Self::Forbidden(_) => "forbidden",
            Self::TransientError(_) => "transient_error",
            Self::Skipped(_) => "skipped",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracted(count) => write!(f, "extracted {} records", count),
            Self::NoData => write!(f, "no product data"),
            Self::Forbidden(detail) => write!(f, "forbidden: {}", detail),
            Self::TransientError(detail) => write!(f, "transient error: {}", detail),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}
