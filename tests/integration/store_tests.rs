//! Integration tests for the SQLite store
//!
//! These exercise the file-backed store across close/reopen boundaries,
//! which the in-memory unit tests cannot cover.

use preview_monitor::storage::{PostStore, SqliteStore};
use preview_monitor::Post;

fn make_post(channel: &str, id: u64) -> Post {
    Post {
        channel: channel.to_string(),
        id,
        url: format!("https://t.me/{}/{}", channel, id),
        text: format!("message {}", id),
        published_at: None,
        media: Vec::new(),
    }
}

#[test]
fn test_posts_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("posts.db");

    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store.create_table("durov").unwrap();
        let posts: Vec<Post> = (1..=10).map(|id| make_post("durov", id)).collect();
        store.insert_posts_batch("durov", &posts).unwrap();
        store.close().unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    assert!(store.table_exists("durov").unwrap());
    assert_eq!(store.count_posts("durov").unwrap(), 10);
    assert!(store.post_exists("durov", "https://t.me/durov/7").unwrap());
}

#[test]
fn test_resume_cursor_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("posts.db");

    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        store.set_resume_cursor("durov", Some(80)).unwrap();
        store.close().unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    assert_eq!(store.resume_cursor("durov").unwrap(), Some(80));
}

#[test]
fn test_channels_are_isolated() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = SqliteStore::open(&dir.path().join("posts.db")).unwrap();

    store.create_table("alpha_news").unwrap();
    store.create_table("beta_news").unwrap();
    store
        .insert_posts_batch("alpha_news", &[make_post("alpha_news", 1)])
        .unwrap();

    assert_eq!(store.count_posts("alpha_news").unwrap(), 1);
    assert_eq!(store.count_posts("beta_news").unwrap(), 0);
    assert!(!store
        .post_exists("beta_news", "https://t.me/alpha_news/1")
        .unwrap());

    // Dropping one empty table leaves the other channel untouched
    assert!(store.drop_table_if_empty("beta_news").unwrap());
    assert_eq!(store.count_posts("alpha_news").unwrap(), 1);
}
