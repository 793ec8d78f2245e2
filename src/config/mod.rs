//! Configuration module for Preview-Monitor
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every option has a default, so running without a config file is supported.
//!
//! # Example
//!
//! ```no_run
//! use preview_monitor::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("monitor.toml")).unwrap();
//! println!("Cycle sleep: {}s", config.monitor.idle_sleep_seconds);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, MonitorConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
