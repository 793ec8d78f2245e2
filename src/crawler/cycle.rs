//! One pass across the configured channel list
//!
//! Channels are processed strictly one after another: the source is
//! rate-sensitive, and sequential fetching is the backpressure strategy.
//! A channel's failure is logged and never aborts the cycle.

use crate::config::Config;
use crate::crawler::channel::{ChannelCrawler, CrawlOutcome, StopReason};
use crate::crawler::shutdown::Shutdown;
use crate::storage::PostStore;
use reqwest::Client;

/// Aggregate result of one crawl cycle
#[derive(Debug)]
pub struct CycleSummary {
    pub outcomes: Vec<CrawlOutcome>,
}

impl CycleSummary {
    /// Total rows persisted across all channels this cycle
    pub fn total_inserted(&self) -> usize {
        self.outcomes.iter().map(|o| o.inserted).sum()
    }

    /// True when every channel that ran ended in an error
    ///
    /// The runner treats such a cycle as a cycle-wide failure and switches to
    /// the shorter error pacing interval.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| o.reason == StopReason::Error)
    }
}

/// Runs one cycle over the configured channels
pub async fn run_cycle<S: PostStore>(
    client: &Client,
    store: &mut S,
    config: &Config,
    channels: &[String],
    shutdown: &Shutdown,
) -> CycleSummary {
    let mut outcomes = Vec::with_capacity(channels.len());

    for channel in channels {
        if shutdown.is_tripped() {
            break;
        }

        let outcome = ChannelCrawler::new(client, store, config, shutdown)
            .crawl(channel)
            .await;

        match &outcome.error {
            Some(error) => {
                tracing::error!("Channel {} failed: {}", channel, error);
            }
            None => {
                tracing::info!(
                    "Channel {}: {} new posts ({})",
                    channel,
                    outcome.inserted,
                    outcome.reason
                );
            }
        }

        outcomes.push(outcome);
    }

    CycleSummary { outcomes }
}
