//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PostStore trait.
//! Each channel gets its own post table, created on first contact and dropped
//! again if the channel never yielded a post.

use crate::extract::Post;
use crate::storage::schema::{create_channel_table_sql, initialize_schema, quote_ident};
use crate::storage::traits::{PostStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and initializes the
    /// bookkeeping schema
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Rejects channel names that cannot safely name a table
///
/// Channels are normalized and validated at the CLI boundary; this guard
/// keeps the store safe when used directly.
fn ensure_valid_channel(channel: &str) -> StorageResult<()> {
    let valid = !channel.is_empty()
        && channel
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidChannel(channel.to_string()))
    }
}

impl PostStore for SqliteStore {
    fn table_exists(&self, channel: &str) -> StorageResult<bool> {
        ensure_valid_channel(channel)?;
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![channel],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_table(&mut self, channel: &str) -> StorageResult<()> {
        ensure_valid_channel(channel)?;
        self.conn.execute_batch(&create_channel_table_sql(channel))?;
        Ok(())
    }

    fn drop_table_if_empty(&mut self, channel: &str) -> StorageResult<bool> {
        ensure_valid_channel(channel)?;
        if !self.table_exists(channel)? || self.count_posts(channel)? > 0 {
            return Ok(false);
        }

        self.conn
            .execute_batch(&format!("DROP TABLE {}", quote_ident(channel)))?;
        self.conn.execute(
            "DELETE FROM crawl_state WHERE channel = ?1",
            params![channel],
        )?;
        Ok(true)
    }

    fn post_exists(&self, channel: &str, url: &str) -> StorageResult<bool> {
        ensure_valid_channel(channel)?;
        if !self.table_exists(channel)? {
            return Ok(false);
        }

        let sql = format!(
            "SELECT 1 FROM {} WHERE url = ?1 LIMIT 1",
            quote_ident(channel)
        );
        let found: Option<i64> = self
            .conn
            .query_row(&sql, params![url], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_posts_batch(&mut self, channel: &str, posts: &[Post]) -> StorageResult<usize> {
        ensure_valid_channel(channel)?;
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let sql = format!(
                "INSERT OR IGNORE INTO {}
                 (url, post_id, channel, text, published_at, media, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                quote_ident(channel)
            );
            let mut stmt = tx.prepare(&sql)?;
            let fetched_at = Utc::now().to_rfc3339();

            for post in posts {
                let media = serde_json::to_string(&post.media)?;
                inserted += stmt.execute(params![
                    post.url,
                    post.id as i64,
                    post.channel,
                    post.text,
                    post.published_at.map(|t| t.to_rfc3339()),
                    media,
                    fetched_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn count_posts(&self, channel: &str) -> StorageResult<u64> {
        ensure_valid_channel(channel)?;
        if !self.table_exists(channel)? {
            return Ok(0);
        }

        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(channel));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn resume_cursor(&self, channel: &str) -> StorageResult<Option<u64>> {
        ensure_valid_channel(channel)?;
        let cursor: Option<Option<i64>> = self
            .conn
            .query_row(
                "SELECT resume_cursor FROM crawl_state WHERE channel = ?1",
                params![channel],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cursor.flatten().map(|c| c as u64))
    }

    fn set_resume_cursor(&mut self, channel: &str, cursor: Option<u64>) -> StorageResult<()> {
        ensure_valid_channel(channel)?;
        match cursor {
            Some(cursor) => {
                self.conn.execute(
                    "INSERT INTO crawl_state (channel, resume_cursor, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(channel) DO UPDATE SET
                         resume_cursor = excluded.resume_cursor,
                         updated_at = excluded.updated_at",
                    params![channel, cursor as i64, Utc::now().to_rfc3339()],
                )?;
            }
            None => {
                self.conn.execute(
                    "DELETE FROM crawl_state WHERE channel = ?1",
                    params![channel],
                )?;
            }
        }
        Ok(())
    }

    fn close(self) -> StorageResult<()> {
        self.conn
            .close()
            .map_err(|(_, e)| StorageError::Sqlite(e))?;
        Ok(())
    }
}
