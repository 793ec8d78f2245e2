use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Preview-Monitor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Crawl loop behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Pause between crawl cycles (seconds)
    #[serde(rename = "idle-sleep-seconds", default = "default_idle_sleep")]
    pub idle_sleep_seconds: u64,

    /// Pause after a failed fetch or a failed cycle (seconds)
    #[serde(rename = "error-sleep-seconds", default = "default_error_sleep")]
    pub error_sleep_seconds: u64,

    /// Maximum page fetches per channel per cycle
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Number of history items one cursor step represents
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u64,

    /// Preview host, overridable for tests and mirrors
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Total per-request timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-seconds", default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Retries for transient failures before a fetch is surfaced as failed
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed delay between retry attempts (seconds)
    #[serde(rename = "backoff-seconds", default = "default_backoff")]
    pub backoff_seconds: u64,
}

impl MonitorConfig {
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_secs(self.idle_sleep_seconds)
    }

    pub fn error_sleep(&self) -> Duration {
        Duration::from_secs(self.error_sleep_seconds)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_sleep_seconds: default_idle_sleep(),
            error_sleep_seconds: default_error_sleep(),
            max_iterations: default_max_iterations(),
            page_size: default_page_size(),
            base_url: default_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            retries: default_retries(),
            backoff_seconds: default_backoff(),
        }
    }
}

fn default_idle_sleep() -> u64 {
    300
}

fn default_error_sleep() -> u64 {
    10
}

fn default_max_iterations() -> u32 {
    50
}

fn default_page_size() -> u64 {
    20
}

fn default_base_url() -> String {
    "https://t.me".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_backoff() -> u64 {
    2
}
