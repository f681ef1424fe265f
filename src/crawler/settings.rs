//! Runtime settings handed to the crawl engine

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::crawler::pacing::DelayRange;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// The single configuration object the crawl engine reads
///
/// Built from a loaded [`Config`] in production, or directly with
/// [`CrawlerSettings::new`] when embedding or testing.
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    pub auth_token: String,
    pub endpoint_url: Url,
    pub user_agent: String,
    pub rate_limit_cooldown: Duration,
    pub request_timeout: Duration,
    pub inter_task_delay: DelayRange,
    pub max_attempts: u32,
    pub max_rate_limit_retries: Option<u32>,
}

impl CrawlerSettings {
    /// Settings with the stock cooldown (60s), timeout (30s), pacing
    /// (1.0 to 3.0s) and attempt budget (3)
    pub fn new(endpoint_url: Url, auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            endpoint_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_cooldown: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            inter_task_delay: DelayRange::new(1.0, 3.0),
            max_attempts: 3,
            max_rate_limit_retries: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let endpoint_url = Url::parse(&config.api.endpoint_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint_url: {}", e)))?;
        let [min_delay, max_delay] = config.crawler.inter_task_delay_range_seconds;

        Ok(Self {
            auth_token: config.api.auth_token.clone(),
            endpoint_url,
            user_agent: config.api.user_agent.clone(),
            rate_limit_cooldown: Duration::from_secs(config.crawler.rate_limit_cooldown_seconds),
            request_timeout: Duration::from_secs(config.crawler.request_timeout_seconds),
            inter_task_delay: DelayRange::new(min_delay, max_delay),
            max_attempts: config.crawler.max_attempts,
            max_rate_limit_retries: config.crawler.max_rate_limit_retries,
        })
    }
}
