//! Error types for the broker topic mirror.
//!
//! These map to the failure kinds observed in the legacy management-console
//! frontend: a snapshot that cannot be mirrored, and a cache-clear command
//! that is rejected or fails remotely. An unresolved selection is not an
//! error (it is an `Option::None`), and a payload that fails JSON parsing
//! falls back to raw text silently.

use thiserror::Error;

/// Result type alias for topic mirror operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the topic mirror.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw snapshot violates the expected nested-mapping shape, or
    /// exceeds the configured depth/node guards. Non-fatal: callers retain
    /// the previous tree and continue on the next snapshot.
    #[error("Malformed topic snapshot: {0}")]
    SnapshotMalformed(String),

    /// A cache-clear request was issued while a previous one is still
    /// outstanding. The second call is rejected, never queued.
    #[error("Cache clear already in progress")]
    CacheClearBusy,

    /// The remote cache-clear command was rejected by the connection.
    /// Surfaced to the user; retry is explicit, never automatic.
    #[error("Clearing the topic tree cache failed: {0}")]
    CacheClearFailed(String),
}

impl Error {
    /// Returns the error type string (for structured surfacing).
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::SnapshotMalformed(_) => "SNAPSHOT_MALFORMED",
            Self::CacheClearBusy => "RESOURCE_BUSY",
            Self::CacheClearFailed(_) => "CACHE_CLEAR_FAILED",
        }
    }

    /// Returns whether the error is recoverable (can be retried).
    ///
    /// Every mirror error is: a malformed snapshot is superseded by the next
    /// refresh, and cache-clear failures are retried by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SnapshotMalformed(_) | Self::CacheClearBusy | Self::CacheClearFailed(_)
        )
    }
}
