//! Change acceptance heuristic.
//!
//! A refreshed node counts as a genuinely new inbound message only when the
//! payload text changed AND the message counter increased. Payload change
//! alone would mis-flag metadata-only refreshes (reconnect re-sends of
//! unchanged state); counter movement alone would miss re-publication of an
//! identical payload. The conjunction approximates "a new message arrived"
//! without a server-assigned sequence id.
//!
//! Known limitation, deliberately left as-is: a counter jump greater than
//! one with a single observed payload change records a single accepted
//! change — the intermediate messages were never delivered to the mirror.

use topic_mirror_core::NodeMeta;

/// Pure acceptance predicate over the previous and current metadata of the
/// selected node.
///
/// An absent previous counter compares as negative infinity, so a topic's
/// first counted message is always accepted. An absent current counter is
/// never an increase.
#[must_use]
pub fn is_accepted_change(previous: &NodeMeta, current: &NodeMeta) -> bool {
    let message_changed = current.message != previous.message;
    let counter_increased = match (previous.message_count, current.message_count) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(prev), Some(cur)) => cur > prev,
    };
    message_changed && counter_increased
}
