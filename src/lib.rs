//! Preview-Monitor: a channel preview archiver
//!
//! This crate implements a scraper that continuously walks the public preview
//! pages of a configured set of messaging channels, persisting newly seen
//! posts and stopping each pass as soon as it reaches already-known history.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Preview-Monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Channel/URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid channel name: {0}")]
    InvalidChannel(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Preview-Monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for channel/URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, Shutdown, StopReason};
pub use extract::Post;
pub use storage::{PostStore, SqliteStore};
