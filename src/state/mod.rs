//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `AttemptOutcome`: the classified result of a single HTTP call
//! - `FetchOutcome`: the terminal result of a task's retry state machine
//! - `TaskOutcome`: what the orchestrator recorded for a finished task

mod attempt;
mod task_outcome;

// Re-export main types
pub use attempt::{AttemptOutcome, FetchOutcome};
pub use task_outcome::TaskOutcome;
