//! Selection tracking across full tree rebuilds.
//!
//! Trees are discarded and rebuilt on every snapshot, so the selection is an
//! id resolved fresh against each new tree by path lookup, never a reference
//! into a particular tree instance. The tracker also owns the history buffer
//! (history belongs to the current selection) and the metadata snapshot the
//! change detector compares against.

use chrono::{DateTime, Utc};
use topic_mirror_core::{NodeMeta, TopicNode};
use tracing::debug;

use crate::history::{HistoryBuffer, HistoryEntry};

/// Tracks the selected node id, its last-accepted metadata, and the
/// per-selection history.
#[derive(Debug)]
pub struct SelectionTracker {
    selected_id: Option<String>,
    last_accepted: NodeMeta,
    history: HistoryBuffer,
}

impl SelectionTracker {
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            selected_id: None,
            last_accepted: NodeMeta::default(),
            history: HistoryBuffer::new(history_capacity),
        }
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// Metadata of the selected node as last accepted (the "previous" side
    /// of the change heuristic).
    #[must_use]
    pub const fn last_accepted(&self) -> &NodeMeta {
        &self.last_accepted
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Select a node. Selecting discards history unrelated to the new node.
    pub fn select(&mut self, node_id: &str, meta: NodeMeta) {
        self.selected_id = Some(node_id.to_string());
        self.last_accepted = meta;
        self.history.clear();
    }

    /// Clear the selection and its history.
    pub fn deselect(&mut self) {
        self.selected_id = None;
        self.last_accepted = NodeMeta::default();
        self.history.clear();
    }

    /// A connection change invalidates both selection and history.
    pub fn on_connection_changed(&mut self) {
        self.deselect();
    }

    /// Record an accepted change: append to history and advance the
    /// last-accepted metadata snapshot.
    pub fn record_accepted(&mut self, meta: NodeMeta, received_at: DateTime<Utc>) {
        self.history.push(HistoryEntry {
            message: meta.message.clone(),
            received_at,
        });
        self.last_accepted = meta;
    }

    /// Resolve the tracked id against a (re)built tree.
    ///
    /// Returns `None` when nothing is selected or the path no longer exists
    /// in the latest snapshot — never an error; the selection stays tracked
    /// and resolves again if the path reappears.
    #[must_use]
    pub fn resolve<'t>(&self, tree: &'t TopicNode) -> Option<&'t TopicNode> {
        let id = self.selected_id.as_deref()?;
        resolve_path(tree, id)
    }
}

/// Walk a tree from its root following the segments of a path-derived id.
#[must_use]
pub fn resolve_path<'t>(tree: &'t TopicNode, id: &str) -> Option<&'t TopicNode> {
    if id == tree.id {
        return Some(tree);
    }
    let rest = id.strip_prefix(tree.id.as_str())?.strip_prefix('/')?;
    let mut current = tree;
    for segment in rest.split('/') {
        match current.child(segment) {
            Some(child) => current = child,
            None => {
                debug!(id, segment, "selected path not present in rebuilt tree");
                return None;
            }
        }
    }
    Some(current)
}
