//! Utility functions for pagination, text shaping, time display and file system checks.
//!
//! This module provides helpers used throughout the crate:
//! - Client-side pagination of fetched article lists
//! - String truncation for logs and page text
//! - HTML escaping and paragraph wrapping for article fragments
//! - Display formatting of publication timestamps
//! - File system validation for output directories

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Slice one page out of `items`.
///
/// Pages are 1-based; page 0 is treated as page 1. A page past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(items.len());
    items[start..end].to_vec()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Keep the first `max` characters, appending `...` if anything was cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max).collect();
        format!("{kept}...")
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap plain text in a single escaped `<p>` element.
pub fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text.trim()))
}

/// Reduce arbitrary text to `[A-Za-z0-9-]` so it is safe inside ids and file names.
pub fn sanitize_id_part(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Parse the timestamp formats the providers use (RFC 3339, or
/// `YYYY-MM-DD HH:MM:SS` in UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| Utc.from_utc_datetime(&n))
        })
}

/// `MM-DD HH:MM` in local time. Unparseable input is returned unchanged.
pub fn format_time(s: &str) -> String {
    match parse_timestamp(s) {
        Some(t) => t.with_timezone(&Local).format("%m-%d %H:%M").to_string(),
        None => s.to_string(),
    }
}

/// Full local date and time, as shown on generated pages.
pub fn format_datetime(s: &str) -> String {
    match parse_timestamp(s) {
        Some(t) => t.with_timezone(&Local).format("%Y/%m/%d %H:%M:%S").to_string(),
        None => s.to_string(),
    }
}

/// Relative age of a timestamp: under an hour, hours, yesterday, or [`format_time`].
pub fn format_relative_time(s: &str, now: DateTime<Utc>) -> String {
    let Some(t) = parse_timestamp(s) else {
        return s.to_string();
    };
    let hours = (now - t).num_hours();
    if hours < 1 {
        "刚刚".to_string()
    } else if hours < 24 {
        format!("{hours}小时前")
    } else if hours < 48 {
        "昨天".to_string()
    } else {
        format_time(s)
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
