//! Listing request executor
//!
//! This module issues the HTTP POST for one task and drives the per-task
//! retry state machine:
//!
//! | Response | Action |
//! |----------|--------|
//! | HTTP 429 | Cool down, then retry the same attempt slot |
//! | HTTP 403 | Terminal → Forbidden |
//! | Other non-2xx | Terminal → TransientError |
//! | Timeout / transport error | Terminal → TransientError |
//! | 2xx with unparsable body | Terminal → TransientError |
//! | 2xx with JSON body | Terminal → Success |
//!
//! Only rate limiting loops. Every other failure ends the task on its first
//! occurrence even though the attempt budget has slots left.

use crate::crawler::pacing::Sleeper;
use crate::crawler::request::RequestContext;
use crate::crawler::settings::CrawlerSettings;
use crate::state::{AttemptOutcome, FetchOutcome};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by every task in a run
pub fn build_http_client(settings: &CrawlerSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.request_timeout)
        .connect_timeout(Duration::from_secs(10).min(settings.request_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Final result of one task's request, with the work it took
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub outcome: FetchOutcome,

    /// HTTP calls issued
    pub requests: u32,

    /// Rate-limit cooldowns waited out
    pub cooldowns: u32,
}

enum RetryState {
    Attempting(u32),
    Done(FetchOutcome),
}

/// Executes listing requests with the rate-limit retry policy
pub struct RetryExecutor {
    client: Client,
    endpoint: Url,
    cooldown: Duration,
    max_attempts: u32,
    max_rate_limit_retries: Option<u32>,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    pub fn new(client: Client, settings: &CrawlerSettings, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            endpoint: settings.endpoint_url.clone(),
            cooldown: settings.rate_limit_cooldown,
            max_attempts: settings.max_attempts,
            max_rate_limit_retries: settings.max_rate_limit_retries,
            sleeper,
        }
    }

    /// Resolves one task to a payload or a terminal failure
    ///
    /// Never returns an error: every HTTP or parse fault becomes
    /// `FetchOutcome::TransientError`.
    pub async fn execute(&self, ctx: &RequestContext) -> FetchReport {
        let mut requests = 0;
        let mut cooldowns = 0;
        let mut state = RetryState::Attempting(1);

        loop {
            state = match state {
                RetryState::Done(outcome) => {
                    tracing::debug!(
                        "Resolved as {} after {} requests ({} cooldowns)",
                        outcome.label(),
                        requests,
                        cooldowns
                    );
                    return FetchReport {
                        outcome,
                        requests,
                        cooldowns,
                    };
                }
                RetryState::Attempting(attempt) if attempt > self.max_attempts => {
                    RetryState::Done(FetchOutcome::TransientError(format!(
                        "attempt budget of {} exhausted",
                        self.max_attempts
                    )))
                }
                RetryState::Attempting(attempt) => {
                    requests += 1;
                    tracing::debug!(
                        "Attempt {}/{} (request {})",
                        attempt,
                        self.max_attempts,
                        requests
                    );

                    match self.attempt(ctx).await {
                        AttemptOutcome::RateLimited => {
                            cooldowns += 1;
                            if self.max_rate_limit_retries.is_some_and(|cap| cooldowns > cap) {
                                RetryState::Done(FetchOutcome::TransientError(format!(
                                    "rate limited {} times in a row",
                                    cooldowns
                                )))
                            } else {
                                tracing::warn!(
                                    "Hit rate limit, retrying after {:?}",
                                    self.cooldown
                                );
                                self.sleeper.sleep(self.cooldown).await;
                                RetryState::Attempting(attempt)
                            }
                        }
                        AttemptOutcome::Success(payload) => {
                            RetryState::Done(FetchOutcome::Success(payload))
                        }
                        AttemptOutcome::Forbidden(detail) => {
                            RetryState::Done(FetchOutcome::Forbidden(detail))
                        }
                        AttemptOutcome::TransientError(detail) => {
                            RetryState::Done(FetchOutcome::TransientError(detail))
                        }
                    }
                }
            };
        }
    }

    /// Issues one POST and classifies the response
    async fn attempt(&self, ctx: &RequestContext) -> AttemptOutcome {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .query(&ctx.query)
            .body("{}");
        for (name, value) in &ctx.headers {
            request = request.header(*name, value.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::TransientError(describe_error(&e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return AttemptOutcome::RateLimited;
        }
        if status == StatusCode::FORBIDDEN {
            return AttemptOutcome::Forbidden(format!("HTTP {}", status));
        }
        if !status.is_success() {
            return AttemptOutcome::TransientError(format!("HTTP {}", status));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::TransientError(describe_error(&e)),
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => AttemptOutcome::Success(payload),
            Err(e) => AttemptOutcome::TransientError(format!("Invalid JSON body: {}", e)),
        }
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
