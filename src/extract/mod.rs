//! Post extraction from channel preview pages
//!
//! This module parses the HTML of a `t.me/s/<channel>` preview page into
//! structured post records. Extraction is a pure transformation: a page with
//! no message widgets yields an empty vector, never an error.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// One post extracted from a preview page
#[derive(Debug, Clone)]
pub struct Post {
    /// Owning channel username
    pub channel: String,

    /// Numeric identifier assigned by the source; decreases as the crawl
    /// walks into history
    pub id: u64,

    /// Canonical post URL, ending in the numeric identifier
    pub url: String,

    /// Message text, empty for media-only posts
    pub text: String,

    /// Publication timestamp, if the markup carried a parseable one
    pub published_at: Option<DateTime<Utc>>,

    /// Photo and video URLs referenced by the message
    pub media: Vec<String>,
}

/// Parses a preview page body into posts, newest first
///
/// Preview pages list messages oldest first; the result is reversed so the
/// newest post comes first, matching the crawler's duplicate check which
/// probes the newest entry of each page.
pub fn extract_posts(channel: &str, html: &str) -> Vec<Post> {
    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    if let Ok(message_selector) = Selector::parse("div.tgme_widget_message[data-post]") {
        for element in document.select(&message_selector) {
            if let Some(post) = extract_post(channel, element) {
                posts.push(post);
            }
        }
    }

    posts.reverse();
    posts
}

/// Extracts a single message widget into a Post
///
/// Returns None when the widget lacks a well-formed `data-post` attribute;
/// such entries (service messages, unsupported widgets) are skipped.
fn extract_post(channel: &str, element: ElementRef) -> Option<Post> {
    let data_post = element.value().attr("data-post")?;
    let (_, id_segment) = data_post.rsplit_once('/')?;
    let id = id_segment.parse::<u64>().ok()?;

    let url = format!("https://t.me/{}", data_post);
    let text = extract_text(element);
    let published_at = extract_published_at(element);
    let media = extract_media(element);

    Some(Post {
        channel: channel.to_string(),
        id,
        url,
        text,
        published_at,
        media,
    })
}

/// Extracts the message text block, empty when absent
fn extract_text(element: ElementRef) -> String {
    let Ok(text_selector) = Selector::parse("div.tgme_widget_message_text") else {
        return String::new();
    };

    element
        .select(&text_selector)
        .next()
        .map(|block| block.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the publication timestamp from the message date widget
fn extract_published_at(element: ElementRef) -> Option<DateTime<Utc>> {
    let time_selector = Selector::parse("time[datetime]").ok()?;

    element
        .select(&time_selector)
        .next()
        .and_then(|time| time.value().attr("datetime"))
        .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
}

/// Collects photo and video URLs attached to the message
fn extract_media(element: ElementRef) -> Vec<String> {
    let mut media = Vec::new();

    // Photos are carried as CSS background images on the wrap anchor
    if let Ok(photo_selector) = Selector::parse("a.tgme_widget_message_photo_wrap") {
        for photo in element.select(&photo_selector) {
            if let Some(url) = photo.value().attr("style").and_then(style_background_url) {
                media.push(url);
            }
        }
    }

    if let Ok(video_selector) = Selector::parse("video[src]") {
        for video in element.select(&video_selector) {
            if let Some(src) = video.value().attr("src") {
                media.push(src.to_string());
            }
        }
    }

    media
}

/// Pulls the URL out of a `background-image:url('...')` style attribute
fn style_background_url(style: &str) -> Option<String> {
    let start = style.find("url('")? + "url('".len();
    let rest = &style[start..];
    let end = rest.find("')")?;
    Some(rest[..end].to_string())
}
