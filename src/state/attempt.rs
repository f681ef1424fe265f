/// Outcome types for individual HTTP attempts and for a task's retry loop
use serde_json::Value;
use std::fmt;

/// Classified result of one HTTP call
///
/// Produced once per attempt and consumed immediately by the retry
/// executor's decision logic; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// 2xx response whose body parsed as JSON
    Success(Value),

    /// HTTP 429; the executor cools down and tries again
    RateLimited,

    /// HTTP 403; the task is abandoned
    Forbidden(String),

    /// Any other status, transport failure, timeout or unparsable body
    TransientError(String),
}

/// Terminal result of a task's retry state machine
///
/// Rate limiting never appears here: it is either retried away or, when a
/// rate-limit retry cap is configured and exceeded, reported as a
/// `TransientError`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(Value),
    Forbidden(String),
    TransientError(String),
}

impl FetchOutcome {
    /// Returns true if a payload was obtained
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Forbidden(_) => "forbidden",
            Self::TransientError(_) => "transient_error",
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => write!(f, "success"),
            Self::Forbidden(detail) => write!(f, "forbidden ({})", detail),
            Self::TransientError(detail) => write!(f, "transient error ({})", detail),
        }
    }
}
