//! Crawl orchestration
//!
//! Enumerates every (location, category) pair, outer loop over locations and
//! inner loop over categories, and drives each task through context
//! building, the retry executor and normalization. A task's failure is
//! logged and counted; the run moves on to the next task. After every task
//! the orchestrator pauses for a random delay to keep the request rate down.

use crate::crawler::executor::{build_http_client, RetryExecutor};
use crate::crawler::normalizer::{Normalized, ResponseNormalizer};
use crate::crawler::pacing::{DelayRange, Sleeper, TokioSleeper};
use crate::crawler::request::RequestContextBuilder;
use crate::crawler::settings::CrawlerSettings;
use crate::input::{CrawlTask, TaskSource};
use crate::output::{project, CrawlStatistics, ProjectedOutput};
use crate::record::ProductRecord;
use crate::state::{FetchOutcome, TaskOutcome};
use crate::ShelfError;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::Instrument;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub capture_date: NaiveDate,

    /// Records in task order
    pub records: Vec<ProductRecord>,

    /// Output column order supplied by the task source
    pub output_fields: Vec<String>,

    pub statistics: CrawlStatistics,
}

impl CrawlReport {
    /// Projects the records onto the output column order
    pub fn project(&self) -> ProjectedOutput {
        project(&self.records, &self.output_fields)
    }
}

/// Drives a sequential crawl over locations x categories
///
/// Owns the HTTP client for the lifetime of the run.
pub struct CrawlOrchestrator {
    contexts: RequestContextBuilder,
    executor: RetryExecutor,
    normalizer: ResponseNormalizer,
    sleeper: Arc<dyn Sleeper>,
    inter_task_delay: DelayRange,
    rng: fastrand::Rng,
}

impl CrawlOrchestrator {
    /// Creates an orchestrator that sleeps on the tokio timer and stamps
    /// records with today's UTC date
    pub fn new(settings: &CrawlerSettings) -> Result<Self, ShelfError> {
        Self::with_sleeper(settings, Arc::new(TokioSleeper), Utc::now().date_naive())
    }

    /// Creates an orchestrator with an explicit sleeper and capture date
    pub fn with_sleeper(
        settings: &CrawlerSettings,
        sleeper: Arc<dyn Sleeper>,
        capture_date: NaiveDate,
    ) -> Result<Self, ShelfError> {
        let client = build_http_client(settings)?;

        Ok(Self {
            contexts: RequestContextBuilder::new(
                &settings.endpoint_url,
                &settings.auth_token,
                &settings.user_agent,
            ),
            executor: RetryExecutor::new(client, settings, Arc::clone(&sleeper)),
            normalizer: ResponseNormalizer::new(capture_date),
            sleeper,
            inter_task_delay: settings.inter_task_delay,
            rng: fastrand::Rng::new(),
        })
    }

    pub fn capture_date(&self) -> NaiveDate {
        self.normalizer.capture_date()
    }

    /// Runs every task the source yields
    ///
    /// Fails only when the source cannot supply its inputs, before any
    /// request is made.
    pub async fn run<S: TaskSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<CrawlReport, ShelfError> {
        let inputs = source.load()?;

        tracing::info!(
            "Crawl started: {} locations x {} categories ({} tasks), capture date {}",
            inputs.locations.len(),
            inputs.categories.len(),
            inputs.task_count(),
            self.capture_date()
        );

        let mut records = Vec::new();
        let mut statistics = CrawlStatistics::new();

        for location in &inputs.locations {
            tracing::info!(
                "Scraping location ({}, {})",
                location.latitude,
                location.longitude
            );

            for category in &inputs.categories {
                let task = CrawlTask { location, category };
                let span = tracing::info_span!(
                    "task",
                    lat = location.latitude,
                    lon = location.longitude,
                    l1 = %category.l1_name,
                    l2 = %category.l2_name
                );

                let outcome = self
                    .run_task(task, &mut records, &mut statistics)
                    .instrument(span)
                    .await;
                tracing::debug!("Task finished: {}", outcome.label());
                statistics.record(&outcome);

                self.pause().await;
            }
        }

        tracing::info!(
            "Crawl finished: {} tasks, {} records, {} failed tasks",
            statistics.tasks_total,
            records.len(),
            statistics.tasks_failed()
        );

        Ok(CrawlReport {
            capture_date: self.capture_date(),
            records,
            output_fields: inputs.output_fields,
            statistics,
        })
    }

    /// Runs one task and appends whatever it extracted to `records`
    async fn run_task(
        &self,
        task: CrawlTask<'_>,
        records: &mut Vec<ProductRecord>,
        statistics: &mut CrawlStatistics,
    ) -> TaskOutcome {
        let category = task.category;
        tracing::info!("Scraping category: {} > {}", category.l1_name, category.l2_name);

        let ctx = match self.contexts.build(task.location, category) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::error!(
                    "Skipping malformed task at ({}, {}) {} > {}: {}",
                    task.location.latitude,
                    task.location.longitude,
                    category.l1_name,
                    category.l2_name,
                    e
                );
                return TaskOutcome::Skipped(e.to_string());
            }
        };

        let report = self.executor.execute(&ctx).await;
        statistics.rate_limit_cooldowns += u64::from(report.cooldowns);

        match report.outcome {
            FetchOutcome::Success(payload) => match self.normalizer.normalize(&payload, category) {
                Normalized::NoData => {
                    tracing::warn!("No product data found");
                    TaskOutcome::NoData
                }
                Normalized::Records(found) => {
                    let count = found.len();
                    tracing::info!("Found {} products", count);
                    records.extend(found);
                    TaskOutcome::Extracted(count)
                }
            },
            FetchOutcome::Forbidden(detail) => {
                tracing::error!(
                    "Forbidden at ({}, {}) {} [{}] > {} [{}]: {}",
                    task.location.latitude,
                    task.location.longitude,
                    category.l1_name,
                    category.l1_id,
                    category.l2_name,
                    category.l2_id,
                    detail
                );
                TaskOutcome::Forbidden(detail)
            }
            FetchOutcome::TransientError(detail) => {
                tracing::error!(
                    "Request failed at ({}, {}) {} [{}] > {} [{}]: {}",
                    task.location.latitude,
                    task.location.longitude,
                    category.l1_name,
                    category.l1_id,
                    category.l2_name,
                    category.l2_id,
                    detail
                );
                TaskOutcome::TransientError(detail)
            }
        }
    }

    async fn pause(&mut self) {
        let delay = self.inter_task_delay.sample(&mut self.rng);
        tracing::debug!("Pausing {:.2}s before next task", delay.as_secs_f64());
        self.sleeper.sleep(delay).await;
    }
}
