use serde::Deserialize;

/// Listing endpoint used when the config does not override it
pub const DEFAULT_ENDPOINT_URL: &str = "https://blinkit.com/v1/layout/listing_widgets";

/// Desktop browser user agent sent with every listing request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
);

/// Main configuration structure for Shelfscan
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Catalog API access
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listing endpoint every task POSTs to
    #[serde(rename = "endpoint-url", default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Fixed auth token sent as the `auth_key` header
    #[serde(rename = "auth-token")]
    pub auth_token: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Request pacing and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Wait after an HTTP 429 before trying the same attempt again (seconds)
    #[serde(rename = "rate-limit-cooldown-seconds", default = "default_cooldown")]
    pub rate_limit_cooldown_seconds: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-seconds", default = "default_timeout")]
    pub request_timeout_seconds: u64,

    /// Bounds of the uniformly random pause after each task (seconds)
    #[serde(
        rename = "inter-task-delay-range-seconds",
        default = "default_delay_range"
    )]
    pub inter_task_delay_range_seconds: [f64; 2],

    /// Attempt slots per task
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Cap on rate-limit cooldowns per task; unbounded when unset
    #[serde(rename = "max-rate-limit-retries", default)]
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            rate_limit_cooldown_seconds: default_cooldown(),
            request_timeout_seconds: default_timeout(),
            inter_task_delay_range_seconds: default_delay_range(),
            max_attempts: default_max_attempts(),
            max_rate_limit_retries: None,
        }
    }
}

/// Flat input files listing locations, categories and output columns
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "locations-path")]
    pub locations_path: String,

    #[serde(rename = "categories-path")]
    pub categories_path: String,

    #[serde(rename = "schema-path")]
    pub schema_path: String,

    /// Leading rows of the schema file to skip before its header row
    #[serde(rename = "schema-skip-rows", default = "default_schema_skip_rows")]
    pub schema_skip_rows: usize,

    /// Header of the schema column holding the output field names
    #[serde(
        rename = "schema-field-column",
        default = "default_schema_field_column"
    )]
    pub schema_field_column: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV file receiving projected rows
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Optional SQLite database that also records runs and rows
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_cooldown() -> u64 {
    60
}

fn default_timeout() -> u64 {
    30
}

fn default_delay_range() -> [f64; 2] {
    [1.0, 3.0]
}

fn default_max_attempts() -> u32 {
    3
}

fn default_schema_skip_rows() -> usize {
    1
}

fn default_schema_field_column() -> String {
    "Field".to_string()
}
