//! Per-channel crawl state machine
//!
//! Walks one channel's preview pages backward through time, persisting
//! unseen posts, until known content or a bound is hit. All pagination and
//! deduplication logic lives here; the fetcher, extractor, and store are
//! collaborators.

use crate::config::Config;
use crate::crawler::cursor::next_cursor;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::shutdown::Shutdown;
use crate::extract::extract_posts;
use crate::storage::PostStore;
use crate::url::{preview_url, with_before};
use reqwest::Client;
use std::fmt;
use url::Url;

/// Why a channel's crawl stopped for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The newest post of a page was already stored; older history is known
    KnownContent,
    /// Cursor advancement reached the start of history
    HistoryBound,
    /// The per-cycle fetch budget was spent
    IterationBudget,
    /// The source denies preview access for this channel
    Forbidden,
    /// A page yielded no posts
    EmptyPage,
    /// Shutdown was signalled mid-crawl
    Cancelled,
    /// The crawl aborted on an error; see CrawlOutcome::error
    Error,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::KnownContent => "reached known content",
            StopReason::HistoryBound => "reached start of history",
            StopReason::IterationBudget => "iteration budget exhausted",
            StopReason::Forbidden => "preview forbidden",
            StopReason::EmptyPage => "empty page",
            StopReason::Cancelled => "cancelled",
            StopReason::Error => "error",
        };
        f.write_str(label)
    }
}

/// Result of one channel's crawl, used for logging and cycle accounting only
#[derive(Debug)]
pub struct CrawlOutcome {
    pub channel: String,
    /// Rows actually persisted this cycle
    pub inserted: usize,
    pub reason: StopReason,
    /// Set when reason is Error
    pub error: Option<String>,
}

/// Per-channel crawler
///
/// Holds references to the shared collaborators for the duration of one
/// channel's crawl; no state survives between channels.
pub struct ChannelCrawler<'a, S: PostStore> {
    client: &'a Client,
    store: &'a mut S,
    config: &'a Config,
    shutdown: &'a Shutdown,
}

impl<'a, S: PostStore> ChannelCrawler<'a, S> {
    pub fn new(
        client: &'a Client,
        store: &'a mut S,
        config: &'a Config,
        shutdown: &'a Shutdown,
    ) -> Self {
        Self {
            client,
            store,
            config,
            shutdown,
        }
    }

    /// Crawls one channel until a stop condition is hit
    ///
    /// Never returns an error: failures are folded into the outcome so one
    /// misbehaving channel cannot abort the cycle.
    pub async fn crawl(&mut self, channel: &str) -> CrawlOutcome {
        let mut inserted = 0;
        match self.crawl_inner(channel, &mut inserted).await {
            Ok(reason) => CrawlOutcome {
                channel: channel.to_string(),
                inserted,
                reason,
                error: None,
            },
            Err(e) => CrawlOutcome {
                channel: channel.to_string(),
                inserted,
                reason: StopReason::Error,
                error: Some(e.to_string()),
            },
        }
    }

    async fn crawl_inner(
        &mut self,
        channel: &str,
        inserted: &mut usize,
    ) -> crate::Result<StopReason> {
        if !self.store.table_exists(channel)? {
            self.store.create_table(channel)?;
            tracing::info!("Created table for new channel {}", channel);
        }

        let base = Url::parse(&self.config.monitor.base_url)?;
        let start = preview_url(&base, channel)?;

        // A budget-exhausted previous cycle leaves a cursor behind; pick up
        // there instead of rewinding to the top of the channel.
        let mut pending_cursor = self.store.resume_cursor(channel)?;
        let mut page_url = match pending_cursor {
            Some(cursor) => {
                tracing::debug!("Resuming {} from saved cursor {}", channel, cursor);
                with_before(&start, cursor)
            }
            None => start.clone(),
        };

        for iteration in 1..=self.config.monitor.max_iterations {
            if self.shutdown.is_tripped() {
                return Ok(StopReason::Cancelled);
            }

            let body = match fetch_page(self.client, &page_url, &self.config.http).await {
                FetchResult::Success { body, .. } => body,
                FetchResult::Forbidden => {
                    tracing::warn!("Preview forbidden for channel {}", channel);
                    self.store.set_resume_cursor(channel, None)?;
                    return Ok(StopReason::Forbidden);
                }
                FetchResult::Failed { error } => {
                    tracing::warn!(
                        "Failed to fetch page for {} (iteration {}): {}",
                        channel,
                        iteration,
                        error
                    );
                    self.shutdown.sleep(self.config.monitor.error_sleep()).await;
                    continue;
                }
            };

            if self.shutdown.is_tripped() {
                return Ok(StopReason::Cancelled);
            }

            let posts = extract_posts(channel, &body);
            if posts.is_empty() {
                if self.store.count_posts(channel)? == 0 {
                    // The table was created speculatively; don't leave it
                    self.store.drop_table_if_empty(channel)?;
                    tracing::warn!("No posts for {}; dropped empty table", channel);
                } else {
                    tracing::warn!("No posts parsed from preview page for {}", channel);
                    self.store.set_resume_cursor(channel, None)?;
                }
                return Ok(StopReason::EmptyPage);
            }

            if self.store.post_exists(channel, &posts[0].url)? {
                tracing::debug!("Newest post of {} already stored; up to date", channel);
                self.store.set_resume_cursor(channel, None)?;
                return Ok(StopReason::KnownContent);
            }

            let added = self.store.insert_posts_batch(channel, &posts)?;
            *inserted += added;
            tracing::info!("Persisted {} new posts for {}", added, channel);

            // The next `before` offset is anchored one page-size step below
            // the newest identifier of the page just consumed.
            let newest_id = posts[0].id;
            match next_cursor(newest_id, self.config.monitor.page_size) {
                Some(cursor) => {
                    pending_cursor = Some(cursor);
                    page_url = with_before(&start, cursor);
                }
                None => {
                    self.store.set_resume_cursor(channel, None)?;
                    return Ok(StopReason::HistoryBound);
                }
            }
        }

        // Budget spent with history still unexplored: remember where to
        // resume so the next cycle does not rewind past discovered pages.
        self.store.set_resume_cursor(channel, pending_cursor)?;
        Ok(StopReason::IterationBudget)
    }
}
