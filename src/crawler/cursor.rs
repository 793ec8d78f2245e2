//! Pagination cursor arithmetic
//!
//! Preview pages are requested backward through history with a `before`
//! offset derived from the page just consumed: one page-size step below its
//! newest identifier. For a dense page that lands exactly on the entry
//! preceding its oldest post.

/// Computes the next `before` cursor from a page's newest post identifier
///
/// Returns None when stepping back one page would produce a non-positive
/// cursor: the source rejects such offsets, so history is exhausted one step
/// before the cursor reaches zero.
pub fn next_cursor(anchor_id: u64, page_size: u64) -> Option<u64> {
    if anchor_id <= page_size {
        None
    } else {
        Some(anchor_id - page_size)
    }
}
