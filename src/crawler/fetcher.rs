//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the monitor, including:
//! - Building the shared HTTP client
//! - Fetching preview pages with retry logic for transient failures
//! - Classifying responses (success / forbidden / failure)

use crate::config::HttpConfig;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The source answered with a redirect (302): preview access is denied
    /// for this resource. A defined soft-stop, not an error.
    Forbidden,

    /// Fetch failed after exhausting the retry budget
    Failed {
        /// Description of the last error
        error: String,
    },
}

/// Builds the shared HTTP client
///
/// Redirects are not followed automatically: a 302 from the source is the
/// forbidden-preview signal and must stay observable.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("preview-monitor/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page, retrying transient failures internally
///
/// Retry policy:
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 302 | Immediate → Forbidden |
/// | HTTP 5xx | Retry up to `retries` times, fixed backoff |
/// | Timeout / connection error | Retry up to `retries` times, fixed backoff |
/// | Other non-success status | Immediate → Failed |
///
/// The caller only observes the final outcome; transient attempts are logged
/// at debug level.
pub async fn fetch_page(client: &Client, url: &Url, config: &HttpConfig) -> FetchResult {
    let mut last_error = String::new();

    for attempt in 0..=config.retries {
        if attempt > 0 {
            tracing::debug!(
                "Retrying {} (attempt {}/{}): {}",
                url,
                attempt,
                config.retries,
                last_error
            );
            tokio::time::sleep(Duration::from_secs(config.backoff_seconds)).await;
        }

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();

                if status == StatusCode::FOUND {
                    return FetchResult::Forbidden;
                }

                if status.is_server_error() {
                    last_error = format!("HTTP {}", status);
                    continue;
                }

                if !status.is_success() {
                    return FetchResult::Failed {
                        error: format!("HTTP {}", status),
                    };
                }

                match response.text().await {
                    Ok(body) => {
                        return FetchResult::Success {
                            status_code: status.as_u16(),
                            body,
                        }
                    }
                    Err(e) => {
                        last_error = e.to_string();
                        continue;
                    }
                }
            }
            Err(e) => {
                last_error = e.to_string();
                continue;
            }
        }
    }

    FetchResult::Failed { error: last_error }
}
