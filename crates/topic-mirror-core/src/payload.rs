//! Payload rendering helpers for the presentation layer.
//!
//! Mirrors the legacy console behavior: previews longer than 37 characters
//! are cut to 36 plus an ellipsis, payloads whose first character is `{` or
//! `[` are treated as structured, and a structured payload that fails to
//! parse renders as its raw text (logged, never surfaced).

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tracing::debug;

/// Payloads longer than this render shortened.
pub const PREVIEW_MAX_CHARS: usize = 37;

/// Shortened payloads keep this many leading characters.
pub const PREVIEW_KEEP_CHARS: usize = 36;

/// Shorten a payload for the tree column.
///
/// Counted in characters, not bytes, so multi-byte payloads never split
/// inside a code point.
#[must_use]
pub fn shorten(payload: &str) -> Cow<'_, str> {
    if payload.chars().count() > PREVIEW_MAX_CHARS {
        let head: String = payload.chars().take(PREVIEW_KEEP_CHARS).collect();
        Cow::Owned(format!("{head}..."))
    } else {
        Cow::Borrowed(payload)
    }
}

/// Whether a textual payload should be treated as structured (JSON).
#[must_use]
pub fn is_structured(payload: &str) -> bool {
    matches!(payload.chars().next(), Some('{' | '['))
}

/// Pretty-print a structured payload with 2-space indentation.
///
/// Parse failure is non-fatal: the raw payload is returned unchanged.
#[must_use]
pub fn prettify(payload: &str) -> Cow<'_, str> {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => Cow::Owned(pretty),
            Err(error) => {
                debug!(%error, "re-serializing parsed payload failed, rendering raw");
                Cow::Borrowed(payload)
            }
        },
        Err(error) => {
            debug!(%error, "payload classified as structured failed to parse, rendering raw");
            Cow::Borrowed(payload)
        }
    }
}

/// Render an acceptance timestamp for the history list (`HH:MM:SS:mmm`).
#[must_use]
pub fn format_history_time(received_at: DateTime<Utc>) -> String {
    received_at.format("%H:%M:%S:%3f").to_string()
}

/// Render a source timestamp (epoch milliseconds) for the detail pane.
///
/// Returns `None` for timestamps outside the representable range.
#[must_use]
pub fn format_source_timestamp(epoch_millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_millis)
        .map(|ts| ts.format("%B %d, %Y %H:%M").to_string())
}
