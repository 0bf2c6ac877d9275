//! View-side state for the broker topic mirror.
//!
//! This crate provides:
//! - Selection tracking across full tree rebuilds (`SelectionTracker`)
//! - The change acceptance heuristic (`is_accepted_change`)
//! - The bounded per-selection history (`HistoryBuffer`)
//! - The event-serialized view session state machine (`MirrorSession`)

#![forbid(unsafe_code)]

pub mod change;
pub mod history;
pub mod selection;
pub mod session;

// Re-export key types for convenience
pub use change::is_accepted_change;
pub use history::{HistoryBuffer, HistoryEntry};
pub use selection::{SelectionTracker, resolve_path};
pub use session::{ConnectionState, MirrorSession, SelectionState};
