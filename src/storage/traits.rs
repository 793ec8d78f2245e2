//! Storage trait and error types
//!
//! This module defines the trait interface for post storage backends and
//! associated error types.

use crate::extract::Post;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid channel name: {0}")]
    InvalidChannel(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for post storage backends
///
/// One table holds each channel's posts; the store also keeps per-channel
/// resume bookkeeping so an iteration-budget stop can pick up where it left
/// off on the next cycle. The store is opened once per run and used
/// sequentially by whichever channel is currently being crawled.
pub trait PostStore {
    /// Checks whether the channel already has a post table
    fn table_exists(&self, channel: &str) -> StorageResult<bool>;

    /// Creates the channel's post table; idempotent
    fn create_table(&mut self, channel: &str) -> StorageResult<()>;

    /// Drops the channel's table only if it holds zero rows
    ///
    /// Returns true when a table was dropped. Used to clean up tables created
    /// speculatively for channels whose preview turned out to be empty.
    fn drop_table_if_empty(&mut self, channel: &str) -> StorageResult<bool>;

    /// Checks whether a post URL is already stored for the channel
    fn post_exists(&self, channel: &str, url: &str) -> StorageResult<bool>;

    /// Inserts a page of posts as one batch, ignoring already-present URLs
    ///
    /// Returns the number of rows actually inserted.
    fn insert_posts_batch(&mut self, channel: &str, posts: &[Post]) -> StorageResult<usize>;

    /// Counts stored posts for the channel; zero when the table is absent
    fn count_posts(&self, channel: &str) -> StorageResult<u64>;

    /// Loads the persisted resume cursor for the channel, if any
    fn resume_cursor(&self, channel: &str) -> StorageResult<Option<u64>>;

    /// Persists (or clears, with None) the channel's resume cursor
    fn set_resume_cursor(&mut self, channel: &str, cursor: Option<u64>) -> StorageResult<()>;

    /// Releases the underlying connection
    ///
    /// Mandatory lifecycle method: the runner always calls it on the way out,
    /// no capability probing.
    fn close(self) -> StorageResult<()>
    where
        Self: Sized;
}
