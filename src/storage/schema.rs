//! Database schema definitions
//!
//! This module contains the SQL schema for the Preview-Monitor database.
//! Posts live in one table per channel; a single bookkeeping table tracks
//! per-channel crawl state across cycles.

use rusqlite::Connection;

/// SQL schema for the bookkeeping tables
pub const SCHEMA_SQL: &str = r#"
-- Per-channel crawl bookkeeping. resume_cursor is set when a crawl stops on
-- its iteration budget with unexplored history remaining, and cleared on any
-- other stop.
CREATE TABLE IF NOT EXISTS crawl_state (
    channel TEXT PRIMARY KEY,
    resume_cursor INTEGER,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the bookkeeping schema
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Returns the CREATE TABLE statement for a channel's post table
///
/// The URL is the primary key; inserts use OR IGNORE so re-persisting an
/// already-seen post is a no-op.
pub fn create_channel_table_sql(channel: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    url TEXT PRIMARY KEY,
    post_id INTEGER NOT NULL,
    channel TEXT NOT NULL,
    text TEXT NOT NULL,
    published_at TEXT,
    media TEXT NOT NULL DEFAULT '[]',
    fetched_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS {index} ON {table}(post_id);
"#,
        table = quote_ident(channel),
        index = quote_ident(&format!("idx_{}_post_id", channel)),
    )
}

/// Quotes a SQL identifier
///
/// Channel names are validated upstream (alphanumeric/underscore), but table
/// names cannot be bound as statement parameters, so they are always quoted
/// here as well.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
