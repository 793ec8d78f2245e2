//! URL handling module for Preview-Monitor
//!
//! This module normalizes channel arguments into bare usernames and builds
//! the preview/pagination URLs the crawler requests.

use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a channel argument into a bare username
///
/// Accepted forms: `username`, `@username`, `t.me/username`,
/// `https://t.me/username`, `t.me/s/username`, each with an optional trailing
/// slash or query string.
///
/// The username shape is validated strictly because it also names the
/// channel's storage table.
pub fn normalize_channel(raw: &str) -> UrlResult<String> {
    let mut rest = raw.trim();

    for prefix in ["https://", "http://"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
        }
    }
    for prefix in ["t.me/", "telegram.me/"] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
        }
    }
    if let Some(stripped) = rest.strip_prefix("s/") {
        rest = stripped;
    }
    if let Some(stripped) = rest.strip_prefix('@') {
        rest = stripped;
    }

    let username = rest
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
        .to_string();

    if !is_valid_username(&username) {
        return Err(UrlError::InvalidChannel(raw.to_string()));
    }

    Ok(username)
}

/// Checks the Telegram username shape: 3-32 characters, alphanumeric or
/// underscore only
fn is_valid_username(name: &str) -> bool {
    (3..=32).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builds the preview page URL for a channel: `<base>/s/<channel>`
pub fn preview_url(base: &Url, channel: &str) -> UrlResult<Url> {
    base.join(&format!("s/{}", channel))
        .map_err(|e| UrlError::Malformed(format!("{}/s/{}: {}", base, channel, e)))
}

/// Returns a copy of `url` with the `before` pagination parameter set
pub fn with_before(url: &Url, before: u64) -> Url {
    let mut paged = url.clone();
    paged
        .query_pairs_mut()
        .clear()
        .append_pair("before", &before.to_string());
    paged
}
