//! Cache invalidation against the broker management connection.
//!
//! The mirror itself only reads snapshots; the one state-mutating call it
//! issues is "clear the server-side topic-tree cache". That call is
//! asynchronous, guarded by a busy flag (a second request while one is
//! outstanding is rejected, never queued), and tolerant of a connection
//! switch while the request is in flight: a completion tagged with a stale
//! connection identity is discarded.
//!
//! The connection handle is passed explicitly at the call sites — there is
//! no ambient global; its lifetime is scoped by the embedding session.

#![forbid(unsafe_code)]

use asupersync::{Cx, Outcome};
use thiserror::Error;
use tracing::{info, warn};

use topic_mirror_core::Error as MirrorError;

/// Rejection payload of a broker management command.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// State-mutating commands the mirror may issue through the external
/// connection. Snapshot delivery is out of scope (transport-owned).
pub trait BrokerCommands {
    /// Direct the remote side to discard its accumulated topic-tree state.
    /// Resolves with no payload, or rejects with a message.
    fn clear_topic_cache(
        &self,
        cx: &Cx,
    ) -> impl Future<Output = Outcome<(), CommandError>> + Send;
}

/// In-flight request token, carrying the connection identity captured when
/// the request started.
#[derive(Debug)]
pub struct ClearCacheRequest {
    connection_id: String,
}

impl ClearCacheRequest {
    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }
}

/// Tracks the busy/error state of the clear-cache affordance.
///
/// Event-serialized shape: `begin` marks the request outstanding, `execute`
/// awaits the command, `complete` folds the result back into the state.
/// Only the execute step suspends; the rest of the view stays interactive
/// while it is pending.
#[derive(Debug, Default)]
pub struct CacheInvalidationClient {
    busy: bool,
    last_error: Option<String>,
}

impl CacheInvalidationClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a clear-cache request is outstanding. Gates only the
    /// clear-cache affordance, nothing else.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Message of the most recent failed request, until the next attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a clear-cache request on the given connection.
    ///
    /// Rejected with [`MirrorError::CacheClearBusy`] while a previous
    /// request is outstanding.
    pub fn begin(&mut self, connection_id: &str) -> Result<ClearCacheRequest, MirrorError> {
        if self.busy {
            warn!(
                event = "cache_clear_rejected",
                connection = connection_id,
                "clear-cache request while one is outstanding"
            );
            return Err(MirrorError::CacheClearBusy);
        }
        self.busy = true;
        self.last_error = None;
        info!(event = "cache_clear_started", connection = connection_id, "clearing topic tree cache");
        Ok(ClearCacheRequest {
            connection_id: connection_id.to_string(),
        })
    }

    /// Await the remote command. Cancellation and panics of the command
    /// future surface as failures; there is no automatic retry.
    pub async fn execute<C: BrokerCommands>(
        cx: &Cx,
        commands: &C,
    ) -> Result<(), CommandError> {
        match commands.clear_topic_cache(cx).await {
            Outcome::Ok(()) => Ok(()),
            Outcome::Err(error) => Err(error),
            other => Err(CommandError::new(format!(
                "command did not complete: {other:?}"
            ))),
        }
    }

    /// Fold a finished request back into the client state.
    ///
    /// If the connection identity captured at request time no longer matches
    /// the current connection, the result is discarded: neither success nor
    /// error of a previous broker's request may leak into this one.
    pub fn complete(
        &mut self,
        request: ClearCacheRequest,
        result: Result<(), CommandError>,
        current_connection_id: &str,
    ) {
        self.busy = false;
        if request.connection_id != current_connection_id {
            info!(
                event = "cache_clear_stale",
                requested_on = %request.connection_id,
                current = current_connection_id,
                "discarding clear-cache result from a previous connection"
            );
            return;
        }
        match result {
            Ok(()) => {
                info!(event = "cache_clear_ok", connection = current_connection_id, "topic tree cache cleared");
                self.last_error = None;
            }
            Err(error) => {
                warn!(
                    event = "cache_clear_failed",
                    connection = current_connection_id,
                    error = %error,
                    "clearing topic tree cache failed"
                );
                self.last_error = Some(error.message);
            }
        }
    }

    /// Convenience driver for callers that hold the client across the await
    /// (the connection identity cannot change underneath them).
    pub async fn clear_cache<C: BrokerCommands>(
        &mut self,
        cx: &Cx,
        commands: &C,
        connection_id: &str,
    ) -> Result<(), MirrorError> {
        let request = self.begin(connection_id)?;
        let result = Self::execute(cx, commands).await;
        let failure = result.as_ref().err().map(|e| e.message.clone());
        self.complete(request, result, connection_id);
        match failure {
            None => Ok(()),
            Some(message) => Err(MirrorError::CacheClearFailed(message)),
        }
    }
}
