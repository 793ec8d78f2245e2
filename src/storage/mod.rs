//! Storage module for persisting crawled posts
//!
//! This module handles all database operations for the monitor, including:
//! - SQLite database initialization and per-channel table management
//! - Idempotent batch insertion of posts keyed by URL
//! - Resume-cursor bookkeeping across crawl cycles

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{PostStore, StorageError, StorageResult};
