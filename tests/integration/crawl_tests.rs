//! Integration tests for the crawler
//!
//! These tests use wiremock to serve fabricated preview pages and drive the
//! per-channel state machine end-to-end against a real SQLite store.

use preview_monitor::config::{Config, HttpConfig, MonitorConfig};
use preview_monitor::crawler::{run_cycle, ChannelCrawler, Shutdown, StopReason};
use preview_monitor::storage::{PostStore, SqliteStore};
use preview_monitor::Post;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests without a `before` pagination parameter (the top page)
struct NoBeforeParam;

impl Match for NoBeforeParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "before")
    }
}

/// Creates a test configuration pointed at the mock server, with pacing
/// sleeps disabled
fn test_config(base_url: &str, max_iterations: u32) -> Config {
    Config {
        monitor: MonitorConfig {
            idle_sleep_seconds: 0,
            error_sleep_seconds: 0,
            max_iterations,
            base_url: base_url.to_string(),
            ..MonitorConfig::default()
        },
        http: HttpConfig {
            retries: 0,
            backoff_seconds: 0,
            ..HttpConfig::default()
        },
    }
}

/// Builds a preview page carrying the given post ids, listed oldest first as
/// on real preview pages
fn preview_page(channel: &str, ids: impl IntoIterator<Item = u64>) -> String {
    let messages: String = ids
        .into_iter()
        .map(|id| {
            format!(
                r#"<div class="tgme_widget_message_wrap">
                  <div class="tgme_widget_message" data-post="{channel}/{id}">
                    <div class="tgme_widget_message_text">message {id}</div>
                    <a class="tgme_widget_message_date" href="https://t.me/{channel}/{id}">
                      <time datetime="2024-03-01T12:00:00+00:00">12:00</time>
                    </a>
                  </div>
                </div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><section class="tgme_channel_history">{messages}</section></body></html>"#
    )
}

/// Mounts a page of posts for the channel, for the top page (before = None)
/// or a specific pagination offset
async fn mount_page(server: &MockServer, channel: &str, before: Option<u64>, ids: Vec<u64>) {
    let body = preview_page(channel, ids);
    let base = Mock::given(method("GET")).and(path(format!("/s/{}", channel)));
    let mock = match before {
        Some(cursor) => base.and(query_param("before", cursor.to_string())),
        None => base.and(NoBeforeParam),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open(&dir.path().join("posts.db")).expect("Failed to open store")
}

#[tokio::test]
async fn test_fresh_channel_crawled_to_history_bound() {
    let server = MockServer::start().await;
    // Top page holds ids 100..81; the follow-up at before=80 reaches the
    // start of history
    mount_page(&server, "durov", None, (81..=100).collect()).await;
    mount_page(&server, "durov", Some(80), (1..=20).collect()).await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let shutdown = Shutdown::new();

    let outcome = ChannelCrawler::new(
        &preview_monitor::crawler::build_http_client(&config.http).unwrap(),
        &mut store,
        &config,
        &shutdown,
    )
    .crawl("durov")
    .await;

    assert_eq!(outcome.reason, StopReason::HistoryBound);
    assert_eq!(outcome.inserted, 40);
    assert_eq!(store.count_posts("durov").unwrap(), 40);
    assert!(store.post_exists("durov", "https://t.me/durov/100").unwrap());
    assert!(store.post_exists("durov", "https://t.me/durov/1").unwrap());
    assert_eq!(store.resume_cursor("durov").unwrap(), None);

    // Exactly two fetches: the top page, then the advanced cursor
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(requests[1].url.query(), Some("before=80"));
}

#[tokio::test]
async fn test_known_content_stops_after_single_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "durov", None, (81..=100).collect()).await;
    mount_page(&server, "durov", Some(80), (1..=20).collect()).await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let first = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;
    assert_eq!(first.inserted, 40);

    // Second cycle: the top page's newest post is already stored
    let second = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(second.reason, StopReason::KnownContent);
    assert_eq!(second.inserted, 0);
    assert_eq!(store.count_posts("durov").unwrap(), 40);

    // Two fetches from the first crawl, one from the second
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_forbidden_preview_stops_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "https://t.me/"))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let outcome = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(outcome.reason, StopReason::Forbidden);
    assert_eq!(outcome.inserted, 0);
    assert!(outcome.error.is_none());
    assert_eq!(store.count_posts("durov").unwrap(), 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_empty_page_drops_speculative_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>no messages</body></html>"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let outcome = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("ghost_channel")
        .await;

    assert_eq!(outcome.reason, StopReason::EmptyPage);
    assert_eq!(outcome.inserted, 0);
    // The speculatively created table is gone
    assert!(!store.table_exists("ghost_channel").unwrap());
}

#[tokio::test]
async fn test_empty_page_keeps_populated_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.create_table("durov").unwrap();
    store
        .insert_posts_batch(
            "durov",
            &[Post {
                channel: "durov".to_string(),
                id: 1,
                url: "https://t.me/durov/1".to_string(),
                text: "old".to_string(),
                published_at: None,
                media: Vec::new(),
            }],
        )
        .unwrap();

    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let outcome = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(outcome.reason, StopReason::EmptyPage);
    assert!(store.table_exists("durov").unwrap());
    assert_eq!(store.count_posts("durov").unwrap(), 1);
}

#[tokio::test]
async fn test_iteration_budget_saves_cursor_and_resumes() {
    let server = MockServer::start().await;
    mount_page(&server, "durov", None, (41..=60).collect()).await;
    mount_page(&server, "durov", Some(40), (21..=40).collect()).await;
    mount_page(&server, "durov", Some(20), (1..=20).collect()).await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    // Budget of two fetches against three pages of unseen history
    let config = test_config(&server.uri(), 2);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let first = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(first.reason, StopReason::IterationBudget);
    assert_eq!(first.inserted, 40);
    assert_eq!(store.resume_cursor("durov").unwrap(), Some(20));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    // The next cycle picks up at the saved cursor instead of rewinding
    let second = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(second.reason, StopReason::HistoryBound);
    assert_eq!(second.inserted, 20);
    assert_eq!(store.count_posts("durov").unwrap(), 60);
    assert_eq!(store.resume_cursor("durov").unwrap(), None);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].url.query(), Some("before=20"));
}

#[tokio::test]
async fn test_failed_fetches_consume_iteration_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 3);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let outcome = ChannelCrawler::new(&client, &mut store, &config, &shutdown)
        .crawl("durov")
        .await;

    assert_eq!(outcome.reason, StopReason::IterationBudget);
    assert_eq!(outcome.inserted, 0);

    // One request per iteration, never more than the budget
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_cycle_isolates_channel_outcomes() {
    let server = MockServer::start().await;
    // alpha's preview is forbidden; beta crawls normally
    Mock::given(method("GET"))
        .and(path("/s/alpha_news"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "https://t.me/"))
        .mount(&server)
        .await;
    mount_page(&server, "beta_news", None, (1..=20).collect()).await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();

    let channels = vec!["alpha_news".to_string(), "beta_news".to_string()];
    let summary = run_cycle(&client, &mut store, &config, &channels, &shutdown).await;

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.outcomes[0].reason, StopReason::Forbidden);
    assert_eq!(summary.outcomes[1].reason, StopReason::HistoryBound);
    assert_eq!(summary.total_inserted(), 20);
    assert!(!summary.all_failed());
}

#[tokio::test]
async fn test_tripped_shutdown_skips_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "durov", None, (1..=20).collect()).await;

    let dir = tempfile::TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let config = test_config(&server.uri(), 10);
    let client = preview_monitor::crawler::build_http_client(&config.http).unwrap();
    let shutdown = Shutdown::new();
    shutdown.trip();

    let summary = run_cycle(
        &client,
        &mut store,
        &config,
        &["durov".to_string()],
        &shutdown,
    )
    .await;

    // No channel ran, nothing was fetched
    assert!(summary.outcomes.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 0);
}
