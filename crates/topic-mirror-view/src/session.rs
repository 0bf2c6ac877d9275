//! View-session state machine tying the mirror together.
//!
//! Events (snapshot arrival, selection, connection changes) are handled one
//! at a time through `&mut self`, so the tree/selection/history triple is
//! never observed half-updated: a full snapshot cycle (rebuild → resolve →
//! detect → maybe-append-history) completes before any interleaved event
//! runs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use topic_mirror_core::{MirrorConfig, Result, TopicNode, build_tree};

use crate::change::is_accepted_change;
use crate::history::HistoryBuffer;
use crate::selection::{SelectionTracker, resolve_path};

/// Connection-level states of the view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    ConnectedNoSnapshot,
    ConnectedWithTree,
}

/// Orthogonal selection sub-state, derived from the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoSelection,
    NodeSelected,
}

/// The topic mirror's view session.
///
/// Owns the current tree (ephemeral, replaced wholesale on every snapshot),
/// the selection tracker (survives rebuilds), and the last-updated stamp
/// shown by the presentation layer.
#[derive(Debug)]
pub struct MirrorSession {
    config: MirrorConfig,
    state: ConnectionState,
    connection_id: Option<String>,
    tree: Option<TopicNode>,
    selection: SelectionTracker,
    last_updated: Option<DateTime<Utc>>,
}

impl MirrorSession {
    #[must_use]
    pub fn new(config: MirrorConfig) -> Self {
        let selection = SelectionTracker::new(config.history_capacity);
        Self {
            config,
            state: ConnectionState::Disconnected,
            connection_id: None,
            tree: None,
            selection,
            last_updated: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn selection_state(&self) -> SelectionState {
        if self.selection.selected_id().is_some() {
            SelectionState::NodeSelected
        } else {
            SelectionState::NoSelection
        }
    }

    #[must_use]
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    #[must_use]
    pub const fn tree(&self) -> Option<&TopicNode> {
        self.tree.as_ref()
    }

    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryBuffer {
        self.selection.history()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selection.selected_id()
    }

    /// The selected node resolved against the current tree, or `None` while
    /// the selection is unresolved (path pruned from the latest snapshot).
    #[must_use]
    pub fn selected_node(&self) -> Option<&TopicNode> {
        self.selection.resolve(self.tree.as_ref()?)
    }

    /// Connect to a broker (or switch between brokers). Clears selection and
    /// history; the tree of the previous connection is dropped.
    pub fn connect(&mut self, connection_id: &str) {
        info!(event = "connection_changed", connection = connection_id, "topic mirror connected");
        self.state = ConnectionState::ConnectedNoSnapshot;
        self.connection_id = Some(connection_id.to_string());
        self.tree = None;
        self.last_updated = None;
        self.selection.on_connection_changed();
    }

    /// Disconnect, from any state. Clears selection, history, and the tree.
    pub fn disconnect(&mut self) {
        info!(event = "disconnected", "topic mirror disconnected");
        self.state = ConnectionState::Disconnected;
        self.connection_id = None;
        self.tree = None;
        self.last_updated = None;
        self.selection.on_connection_changed();
    }

    /// Apply a full-state snapshot: rebuild the tree, re-resolve the
    /// selection, and append to history if the refresh is an accepted change.
    ///
    /// A malformed snapshot retains the previous tree and returns the error;
    /// the session stays consistent and processes the next snapshot normally.
    pub fn apply_snapshot(&mut self, raw: &Value) -> Result<()> {
        if self.state == ConnectionState::Disconnected {
            warn!(event = "snapshot_ignored", "snapshot received while disconnected");
            return Ok(());
        }

        let tree = build_tree(raw, &self.config)?;

        let selected_id = self.selection.selected_id().map(str::to_string);
        if let Some(id) = selected_id {
            match resolve_path(&tree, &id) {
                Some(node) => {
                    if is_accepted_change(self.selection.last_accepted(), &node.meta) {
                        let meta = node.meta.clone();
                        debug!(
                            event = "change_accepted",
                            id = %id,
                            message_count = meta.message_count,
                            "accepted new message for selected topic"
                        );
                        self.selection.record_accepted(meta, Utc::now());
                    }
                }
                None => {
                    debug!(event = "selection_unresolved", id = %id, "selected path absent from snapshot");
                }
            }
        }

        self.tree = Some(tree);
        self.state = ConnectionState::ConnectedWithTree;
        self.last_updated = Some(Utc::now());
        Ok(())
    }

    /// Select a node by id; clears history. The node's current metadata (if
    /// the id resolves against the current tree) becomes the comparison
    /// baseline for the change detector.
    pub fn select(&mut self, node_id: &str) {
        let meta = self
            .tree
            .as_ref()
            .and_then(|tree| resolve_path(tree, node_id))
            .map(|node| node.meta.clone())
            .unwrap_or_default();
        self.selection.select(node_id, meta);
    }

    /// Explicitly clear the selection and its history.
    pub fn deselect(&mut self) {
        self.selection.deselect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connected_session() -> MirrorSession {
        let mut session = MirrorSession::new(MirrorConfig::default());
        session.connect("broker-1");
        session
    }

    #[test]
    fn fresh_session_is_disconnected() {
        let session = MirrorSession::new(MirrorConfig::default());
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.selection_state(), SelectionState::NoSelection);
        assert!(session.tree().is_none());
    }

    #[test]
    fn connect_then_snapshot_reaches_connected_with_tree() {
        let mut session = connected_session();
        assert_eq!(session.state(), ConnectionState::ConnectedNoSnapshot);

        session
            .apply_snapshot(&json!({"sensors": {}}))
            .expect("snapshot");
        assert_eq!(session.state(), ConnectionState::ConnectedWithTree);
        assert!(session.last_updated().is_some());
        assert!(session.tree().is_some());
    }

    #[test]
    fn snapshot_while_disconnected_is_ignored() {
        let mut session = MirrorSession::new(MirrorConfig::default());
        session
            .apply_snapshot(&json!({"sensors": {}}))
            .expect("ignored");
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.tree().is_none());
    }

    #[test]
    fn malformed_snapshot_retains_previous_tree() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({"sensors": {"temp": {"_message": "21"}}}))
            .expect("good snapshot");
        let before = session.tree().cloned();

        let err = session
            .apply_snapshot(&json!({"sensors": "busted"}))
            .unwrap_err();
        assert_eq!(err.error_type(), "SNAPSHOT_MALFORMED");
        assert_eq!(session.tree(), before.as_ref());
        assert_eq!(session.state(), ConnectionState::ConnectedWithTree);

        // Processing continues on the next snapshot.
        session
            .apply_snapshot(&json!({"sensors": {}}))
            .expect("next snapshot");
    }

    #[test]
    fn malformed_snapshot_never_disturbs_selection_or_history() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({"t": {"_message": "1", "_messagesCounter": 1}}))
            .expect("snapshot");
        session.select("topic-tree-root/t");
        session
            .apply_snapshot(&json!({"t": {"_message": "2", "_messagesCounter": 2}}))
            .expect("snapshot");
        assert_eq!(session.history().len(), 1);

        let _ = session.apply_snapshot(&json!(42)).unwrap_err();
        assert_eq!(session.selected_id(), Some("topic-tree-root/t"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn accepted_change_appends_exactly_one_entry() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({
                "sensors": {"temp": {"_message": "21", "_messagesCounter": 1, "_topic": "sensors/temp"}}
            }))
            .expect("snapshot");
        session.select("topic-tree-root/sensors/temp");
        assert!(session.history().is_empty(), "selecting must not append");

        session
            .apply_snapshot(&json!({
                "sensors": {"temp": {"_message": "22", "_messagesCounter": 2, "_topic": "sensors/temp"}}
            }))
            .expect("snapshot");
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.history().get(0).and_then(|e| e.message.as_deref()),
            Some("22")
        );
    }

    #[test]
    fn stale_resend_does_not_append() {
        let mut session = connected_session();
        let snapshot = json!({
            "sensors": {"temp": {"_message": "21", "_messagesCounter": 5}}
        });
        session.apply_snapshot(&snapshot).expect("snapshot");
        session.select("topic-tree-root/sensors/temp");

        // Same payload, same counter: a reconnect re-send, not a new message.
        session.apply_snapshot(&snapshot).expect("resend");
        assert!(session.history().is_empty());
    }

    #[test]
    fn unresolved_selection_persists_until_path_reappears() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({"a": {"_message": "1", "_messagesCounter": 1}}))
            .expect("snapshot");
        session.select("topic-tree-root/a");

        session.apply_snapshot(&json!({"b": {}})).expect("pruned");
        assert_eq!(session.selection_state(), SelectionState::NodeSelected);
        assert!(session.selected_node().is_none(), "currently unresolved");

        session
            .apply_snapshot(&json!({"a": {"_message": "2", "_messagesCounter": 2}}))
            .expect("reappeared");
        let node = session.selected_node().expect("resolved again");
        assert_eq!(node.meta.message.as_deref(), Some("2"));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn connection_switch_clears_selection_and_history() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({"a": {"_message": "1", "_messagesCounter": 1}}))
            .expect("snapshot");
        session.select("topic-tree-root/a");
        session
            .apply_snapshot(&json!({"a": {"_message": "2", "_messagesCounter": 2}}))
            .expect("snapshot");
        assert_eq!(session.history().len(), 1);

        session.connect("broker-2");
        assert_eq!(session.state(), ConnectionState::ConnectedNoSnapshot);
        assert_eq!(session.selection_state(), SelectionState::NoSelection);
        assert!(session.history().is_empty());
        assert!(session.tree().is_none());
        assert_eq!(session.connection_id(), Some("broker-2"));
    }

    #[test]
    fn disconnect_clears_from_any_state() {
        let mut session = connected_session();
        session.apply_snapshot(&json!({"a": {}})).expect("snapshot");
        session.select("topic-tree-root/a");

        session.disconnect();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.connection_id().is_none());
        assert!(session.tree().is_none());
        assert_eq!(session.selection_state(), SelectionState::NoSelection);
    }

    #[test]
    fn select_unknown_id_stays_unresolved_until_snapshot_carries_it() {
        let mut session = connected_session();
        session.apply_snapshot(&json!({"a": {}})).expect("snapshot");
        session.select("topic-tree-root/ghost");
        assert!(session.selected_node().is_none());

        session
            .apply_snapshot(&json!({"a": {}, "ghost": {"_message": "boo", "_messagesCounter": 1}}))
            .expect("snapshot");
        assert!(session.selected_node().is_some());
        // First counted message on a fresh baseline is an accepted change.
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn deselect_clears_selection_and_history() {
        let mut session = connected_session();
        session
            .apply_snapshot(&json!({"a": {"_message": "1", "_messagesCounter": 1}}))
            .expect("snapshot");
        session.select("topic-tree-root/a");
        session
            .apply_snapshot(&json!({"a": {"_message": "2", "_messagesCounter": 2}}))
            .expect("snapshot");

        session.deselect();
        assert_eq!(session.selection_state(), SelectionState::NoSelection);
        assert!(session.history().is_empty());
    }
}
