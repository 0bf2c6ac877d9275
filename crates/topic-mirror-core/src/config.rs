//! Configuration for the topic mirror.
//!
//! Tunables are loaded from environment variables with sane defaults, so an
//! embedding application can cap snapshot recursion and history retention
//! without code changes. Snapshot arrival rate is controlled upstream; these
//! limits only guard against pathological input.

use std::env;

/// Default maximum nesting depth accepted from a raw snapshot.
pub const DEFAULT_MAX_SNAPSHOT_DEPTH: usize = 64;

/// Default maximum total node count accepted from a raw snapshot.
pub const DEFAULT_MAX_SNAPSHOT_NODES: usize = 250_000;

/// Default capacity of the per-selection message history buffer.
///
/// Matches the legacy frontend, which kept the most recent 51 accepted
/// payloads for the selected topic.
pub const DEFAULT_HISTORY_CAPACITY: usize = 51;

/// Runtime tunables for snapshot mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Maximum nesting depth before a snapshot is rejected as malformed.
    pub max_snapshot_depth: usize,
    /// Maximum node count before a snapshot is rejected as malformed.
    pub max_snapshot_nodes: usize,
    /// Capacity of the history buffer for the selected topic.
    pub history_capacity: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            max_snapshot_depth: DEFAULT_MAX_SNAPSHOT_DEPTH,
            max_snapshot_nodes: DEFAULT_MAX_SNAPSHOT_NODES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MirrorConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.max_snapshot_depth =
            env_usize("TOPIC_MIRROR_MAX_SNAPSHOT_DEPTH", config.max_snapshot_depth).max(1);
        config.max_snapshot_nodes =
            env_usize("TOPIC_MIRROR_MAX_SNAPSHOT_NODES", config.max_snapshot_nodes).max(1);
        config.history_capacity =
            env_usize("TOPIC_MIRROR_HISTORY_CAPACITY", config.history_capacity).max(1);
        config
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_usize(key: &str, default: usize) -> usize {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
