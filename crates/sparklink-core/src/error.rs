//! Engine error types.
//!
//! Every error here is recoverable: the caller keeps its state machine and
//! may retry after a `deactivate` or `close`. Stale timers are not errors;
//! they are dropped and logged at debug level.

use thiserror::Error;

use crate::peer::PeerId;

/// Errors surfaced synchronously to the caller of an engine operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Operation not allowed in the current state, e.g. activating while
    /// already scanning.
    #[error("cannot {operation} while {state}")]
    InvalidStateTransition {
        /// State the machine was in.
        state: String,
        /// Rejected operation.
        operation: String,
    },

    /// Input rejected before any state changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl EngineError {
    pub(crate) fn invalid_state(state: impl ToString, operation: &str) -> Self {
        Self::InvalidStateTransition { state: state.to_string(), operation: operation.to_string() }
    }
}

/// Rejected user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Message text was empty or whitespace only.
    #[error("message text is empty")]
    EmptyMessage,

    /// Peer is not among the currently discovered peers.
    #[error("peer {0} is not nearby")]
    UnknownPeer(PeerId),
}
