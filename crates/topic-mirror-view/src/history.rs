//! Bounded, most-recent-first history of accepted message changes.
//!
//! Owned by the current selection: cleared whenever the selection or the
//! connection changes, appended to only when the change detector accepts a
//! refresh. Push cost is bounded by the capacity, independent of overall
//! message volume.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// One accepted change, captured at acceptance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Payload of the accepted message (absent payloads can still be
    /// accepted when only the counter moved from nothing).
    pub message: Option<String>,
    /// When the mirror accepted the change.
    pub received_at: DateTime<Utc>,
}

/// Fixed-capacity buffer with entry 0 always the most recent.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Prepend an entry, then truncate to capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Entries newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
