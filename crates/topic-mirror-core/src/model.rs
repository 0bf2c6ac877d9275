//! Data model for the mirrored topic tree.
//!
//! A tree is ephemeral: it is rebuilt in full from every snapshot and owned
//! by the current rendering cycle. Anything that must survive a rebuild
//! (selection, history) therefore keys off node ids, never node references.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::payload;

/// Per-topic metadata carried by the reserved snapshot keys.
///
/// All fields are optional: interior nodes frequently carry none, and the
/// upstream source only attaches counters and payloads to topics that have
/// seen traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Last payload seen on this topic.
    pub message: Option<String>,
    /// Total messages observed on this topic.
    pub message_count: Option<u64>,
    /// Number of subtopics below this topic.
    pub subtopic_count: Option<u64>,
    /// QoS of the last message (0, 1 or 2).
    pub qos: Option<u8>,
    /// Retain flag of the last message.
    pub retain: Option<bool>,
    /// Source creation timestamp, epoch milliseconds.
    pub created_at: Option<i64>,
    /// Source last-modified timestamp, epoch milliseconds.
    pub last_modified_at: Option<i64>,
    /// Full topic path as reported by the source.
    pub full_path: Option<String>,
}

impl NodeMeta {
    /// Preview for the tree column: shortened payload, or nothing when the
    /// payload is structured (structured payloads render only in the detail
    /// pane, pretty-printed).
    #[must_use]
    pub fn inline_preview(&self) -> Option<Cow<'_, str>> {
        self.message
            .as_deref()
            .filter(|m| !payload::is_structured(m))
            .map(payload::shorten)
    }

    /// Full payload for the detail pane: pretty-printed when structured,
    /// raw otherwise.
    #[must_use]
    pub fn detail_payload(&self) -> Option<Cow<'_, str>> {
        self.message.as_deref().map(|m| {
            if payload::is_structured(m) {
                payload::prettify(m)
            } else {
                Cow::Borrowed(m)
            }
        })
    }
}

/// One node of the mirrored topic tree.
///
/// # Constraints
/// - `id`: unique within a tree; equals `parent_id + "/" + segment`, with a
///   fixed sentinel at the root.
/// - `children`: snapshot enumeration order, source-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    pub children: Vec<TopicNode>,
    #[serde(flatten)]
    pub meta: NodeMeta,
}

impl TopicNode {
    /// Find a direct child by segment name.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == segment)
    }

    /// Total node count of this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}
