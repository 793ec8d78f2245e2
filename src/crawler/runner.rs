//! Outer resilience loop
//!
//! Drives crawl cycles forever with pacing between them: the idle interval
//! after a normal cycle, the shorter error interval after a cycle in which
//! every channel failed. The loop ends only when shutdown is signalled, and
//! always closes the store on the way out.

use crate::config::Config;
use crate::crawler::cycle::run_cycle;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::shutdown::Shutdown;
use crate::storage::{PostStore, SqliteStore};
use std::path::Path;

/// Runs the monitor until shutdown
///
/// Opens the store and HTTP client once, installs a Ctrl-C listener that
/// trips the shutdown token, then loops over crawl cycles. Interrupted
/// termination is a normal return, not an error.
pub async fn run(config: Config, channels: Vec<String>, db_path: &Path) -> crate::Result<()> {
    let store = SqliteStore::open(db_path)?;
    let client = build_http_client(&config.http)?;
    let shutdown = Shutdown::new();

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received, finishing current work");
                shutdown.trip();
            }
        });
    }

    tracing::info!(
        "Monitoring {} channels (cycle sleep {}s)",
        channels.len(),
        config.monitor.idle_sleep_seconds
    );

    run_loop(&config, &channels, client, store, &shutdown).await
}

/// The cycle/sleep loop; returns once shutdown trips and the store is closed
async fn run_loop(
    config: &Config,
    channels: &[String],
    client: reqwest::Client,
    mut store: SqliteStore,
    shutdown: &Shutdown,
) -> crate::Result<()> {
    while !shutdown.is_tripped() {
        let summary = run_cycle(&client, &mut store, config, channels, shutdown).await;

        if shutdown.is_tripped() {
            break;
        }

        if summary.all_failed() {
            tracing::error!(
                "Cycle failed for all {} channels, retrying in {}s",
                summary.outcomes.len(),
                config.monitor.error_sleep_seconds
            );
            shutdown.sleep(config.monitor.error_sleep()).await;
        } else {
            tracing::info!(
                "Cycle complete: {} new posts, sleeping {}s",
                summary.total_inserted(),
                config.monitor.idle_sleep_seconds
            );
            shutdown.sleep(config.monitor.idle_sleep()).await;
        }
    }

    store.close()?;
    tracing::info!("Store closed, exiting");
    Ok(())
}
