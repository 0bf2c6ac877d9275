//! Raw snapshot decoding.
//!
//! A snapshot level is a JSON object whose keys are either reserved metadata
//! keys (leading underscore) or child topic segments. `RawLevel::split`
//! formalizes that convention as a tagged structure so the tree builder never
//! sniffs prefixes itself.
//!
//! Reserved keys follow the upstream wire format:
//! `_message`, `_messagesCounter`, `_topicsCounter`, `_qos`, `_retain`,
//! `_created`, `_lastModified`, `_topic`. Unknown reserved keys, and known
//! keys carrying a value of unexpected type, are treated as absent — a weird
//! field on one topic must not reject the whole snapshot.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::model::NodeMeta;

/// Reserved top-level key a snapshot may wrap its real root under.
/// Unwrapped exactly once before recursion.
pub const WRAPPER_KEY: &str = "topicTree";

/// Prefix distinguishing metadata keys from child segments.
pub const RESERVED_PREFIX: char = '_';

/// One decoded snapshot level: metadata plus the ordered child map.
#[derive(Debug)]
pub struct RawLevel<'a> {
    pub meta: NodeMeta,
    /// Child segments in snapshot enumeration order (`preserve_order` keeps
    /// the source's JSON object order intact).
    pub children: IndexMap<&'a str, &'a Value>,
}

impl<'a> RawLevel<'a> {
    /// Split a raw level into metadata and children.
    ///
    /// Returns `None` when `raw` is not a JSON object; the caller turns that
    /// into a `SnapshotMalformed` with path context.
    #[must_use]
    pub fn split(raw: &'a Value) -> Option<Self> {
        let map = raw.as_object()?;
        let mut meta = NodeMeta::default();
        let mut children = IndexMap::new();
        for (key, value) in map {
            if key.starts_with(RESERVED_PREFIX) {
                apply_reserved(&mut meta, key, value);
            } else {
                children.insert(key.as_str(), value);
            }
        }
        Some(Self { meta, children })
    }
}

fn apply_reserved(meta: &mut NodeMeta, key: &str, value: &Value) {
    match key {
        "_message" => meta.message = expect_str(key, value),
        "_messagesCounter" => meta.message_count = expect_u64(key, value),
        "_topicsCounter" => meta.subtopic_count = expect_u64(key, value),
        "_qos" => {
            meta.qos = match value.as_u64() {
                Some(qos @ 0..=2) => u8::try_from(qos).ok(),
                _ => {
                    debug!(key, %value, "ignoring reserved key with invalid QoS value");
                    None
                }
            };
        }
        "_retain" => meta.retain = expect_bool(key, value),
        "_created" => meta.created_at = expect_i64(key, value),
        "_lastModified" => meta.last_modified_at = expect_i64(key, value),
        "_topic" => meta.full_path = expect_str(key, value),
        // Unknown reserved keys are metadata we don't mirror; they must
        // still never be mistaken for child segments.
        _ => {}
    }
}

fn expect_str(key: &str, value: &Value) -> Option<String> {
    let parsed = value.as_str().map(str::to_string);
    if parsed.is_none() {
        debug!(key, %value, "ignoring reserved key with non-string value");
    }
    parsed
}

fn expect_u64(key: &str, value: &Value) -> Option<u64> {
    let parsed = value.as_u64();
    if parsed.is_none() {
        debug!(key, %value, "ignoring reserved key with non-integer value");
    }
    parsed
}

fn expect_i64(key: &str, value: &Value) -> Option<i64> {
    let parsed = value.as_i64();
    if parsed.is_none() {
        debug!(key, %value, "ignoring reserved key with non-integer value");
    }
    parsed
}

fn expect_bool(key: &str, value: &Value) -> Option<bool> {
    let parsed = value.as_bool();
    if parsed.is_none() {
        debug!(key, %value, "ignoring reserved key with non-boolean value");
    }
    parsed
}
