//! Tree builder: raw snapshot in, canonical topic tree out.
//!
//! The builder is pure and deterministic — rebuilding from an unchanged
//! snapshot yields a structurally identical tree (same ids, same order, same
//! metadata). Every refresh is a full rebuild from a full snapshot; the
//! arrival rate is limited upstream, so linear cost per snapshot is fine.
//!
//! Recursion over externally supplied data is guarded: nesting deeper than
//! the configured depth limit or a node count above the configured ceiling
//! rejects the snapshot as malformed instead of exhausting the stack.

use serde_json::Value;
use tracing::warn;

use crate::config::MirrorConfig;
use crate::error::{Error, Result};
use crate::model::TopicNode;
use crate::snapshot::{RawLevel, WRAPPER_KEY};

/// Fixed sentinel id of the tree root.
pub const ROOT_ID: &str = "topic-tree-root";

/// Display name of the tree root.
pub const ROOT_NAME: &str = "Topic Tree";

/// Build a topic tree from a raw snapshot, rooted at the default sentinel.
pub fn build_tree(raw: &Value, config: &MirrorConfig) -> Result<TopicNode> {
    build_tree_with_root(raw, ROOT_ID, ROOT_NAME, config)
}

/// Build a topic tree from a raw snapshot with an explicit root id and name.
///
/// If the outermost object carries the reserved wrapper key, the real root
/// is unwrapped from it exactly once before recursion.
pub fn build_tree_with_root(
    raw: &Value,
    root_id: &str,
    root_name: &str,
    config: &MirrorConfig,
) -> Result<TopicNode> {
    let unwrapped = match raw {
        Value::Object(map) => map.get(WRAPPER_KEY).unwrap_or(raw),
        _ => {
            return Err(malformed(format!(
                "expected a mapping at the snapshot root, got {}",
                type_name(raw)
            )));
        }
    };

    let mut budget = NodeBudget {
        remaining: config.max_snapshot_nodes,
    };
    build_node(
        unwrapped,
        root_id.to_string(),
        root_name.to_string(),
        config.max_snapshot_depth,
        &mut budget,
    )
}

struct NodeBudget {
    remaining: usize,
}

fn build_node(
    raw: &Value,
    id: String,
    name: String,
    depth_left: usize,
    budget: &mut NodeBudget,
) -> Result<TopicNode> {
    if budget.remaining == 0 {
        return Err(malformed(format!("node count limit exceeded at {id}")));
    }
    budget.remaining -= 1;

    let Some(level) = RawLevel::split(raw) else {
        return Err(malformed(format!(
            "expected a mapping at {id}, got {}",
            type_name(raw)
        )));
    };

    if depth_left == 0 && !level.children.is_empty() {
        return Err(malformed(format!("nesting depth limit exceeded at {id}")));
    }

    let mut children = Vec::with_capacity(level.children.len());
    for (segment, value) in level.children {
        let child_id = format!("{id}/{segment}");
        children.push(build_node(
            value,
            child_id,
            segment.to_string(),
            depth_left - 1,
            budget,
        )?);
    }

    Ok(TopicNode {
        id,
        name,
        children,
        meta: level.meta,
    })
}

fn malformed(detail: String) -> Error {
    warn!(event = "snapshot_malformed", detail = %detail, "rejecting topic snapshot");
    Error::SnapshotMalformed(detail)
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
