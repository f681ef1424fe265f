//! Run statistics
//!
//! Counts what happened to every task in a run, for the end-of-run log line,
//! the CLI report and the SQLite run table.

use crate::state::TaskOutcome;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Tasks enumerated (locations x categories)
    pub tasks_total: u64,

    /// Tasks whose payload produced at least one record
    pub tasks_extracted: u64,

    /// Tasks that succeeded with zero listing items
    pub tasks_no_data: u64,

    pub tasks_forbidden: u64,
    pub tasks_transient_error: u64,

    /// Tasks skipped because they could not be built
    pub tasks_skipped: u64,

    /// Rate-limit cooldowns waited out across the run
    pub rate_limit_cooldowns: u64,

    /// Records accumulated
    pub records: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one finished task into the counts
    pub fn record(&mut self, outcome: &TaskOutcome) {
        self.tasks_total += 1;
        self.records += outcome.record_count() as u64;
        match outcome {
            TaskOutcome::Extracted(_) => self.tasks_extracted += 1,
            TaskOutcome::NoData => self.tasks_no_data += 1,
            TaskOutcome::Forbidden(_) => self.tasks_forbidden += 1,
            TaskOutcome::TransientError(_) => self.tasks_transient_error += 1,
            TaskOutcome::Skipped(_) => self.tasks_skipped += 1,
        }
    }

    pub fn tasks_failed(&self) -> u64 {
        self.tasks_forbidden + self.tasks_transient_error + self.tasks_skipped
    }

    /// Share of tasks whose request succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.tasks_total == 0 {
            return 0.0;
        }
        ((self.tasks_extracted + self.tasks_no_data) as f64 / self.tasks_total as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Tasks: {}", stats.tasks_total);
    println!("  Records: {}", stats.records);
    println!("  Rate-limit cooldowns: {}", stats.rate_limit_cooldowns);
    println!();

    println!("Tasks by Outcome:");
    for (label, count) in [
        ("extracted", stats.tasks_extracted),
        ("no_data", stats.tasks_no_data),
        ("forbidden", stats.tasks_forbidden),
        ("transient_error", stats.tasks_transient_error),
        ("skipped", stats.tasks_skipped),
    ] {
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / stats.tasks_total as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} tasks answered)",
        stats.success_rate(),
        stats.tasks_extracted + stats.tasks_no_data,
        stats.tasks_total
    );
}
