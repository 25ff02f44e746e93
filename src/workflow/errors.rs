//! # Recovery Errors
//!
//! Only failures the hosting infrastructure has to act on are errors.
//! Discarded edits are regular outcomes.

use thiserror::Error;

use crate::redirects::RedirectError;
use crate::store::StoreError;
use crate::transport::TransportError;

/// Result type for recovery workflow operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

#[derive(Debug, Clone, Error)]
pub enum RecoveryError {
    /// Another writer committed to the failure between read and commit.
    /// Nothing was applied and nothing was dispatched.
    #[error("Commit conflict on failure {failed_message_id}: {source}")]
    CommitConflict {
        failed_message_id: String,
        #[source]
        source: StoreError,
    },

    /// The edit was committed but the message could not be dispatched.
    #[error("Dispatch of edit for failure {failed_message_id} to {destination} failed: {source}")]
    Transport {
        failed_message_id: String,
        destination: String,
        #[source]
        source: TransportError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Redirect store error: {0}")]
    Redirects(#[from] RedirectError),

    #[error("Edit cancelled (committed: {committed})")]
    Cancelled { committed: bool },

    #[error("Invalid edit command: {0}")]
    InvalidCommand(String),

    #[error("Forbidden edit state transition: {from} -> {to}")]
    ForbiddenTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl RecoveryError {
    pub fn forbidden_transition(from: &'static str, to: &'static str) -> Self {
        Self::ForbiddenTransition { from, to }
    }

    /// Whether redelivering the same command may succeed.
    ///
    /// A redelivered command that was already committed takes the replay
    /// path, so every failure after commit is safe to retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            RecoveryError::CommitConflict { .. }
            | RecoveryError::Transport { .. }
            | RecoveryError::Store(_)
            | RecoveryError::Cancelled { .. } => true,
            RecoveryError::Redirects(e) => e.is_transient(),
            RecoveryError::InvalidCommand(_) | RecoveryError::ForbiddenTransition { .. } => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RecoveryError::CommitConflict { .. } => "COMMIT_CONFLICT",
            RecoveryError::Transport { .. } => "TRANSPORT",
            RecoveryError::Store(_) => "STORE",
            RecoveryError::Redirects(_) => "REDIRECTS",
            RecoveryError::Cancelled { .. } => "CANCELLED",
            RecoveryError::InvalidCommand(_) => "INVALID_COMMAND",
            RecoveryError::ForbiddenTransition { .. } => "FORBIDDEN_TRANSITION",
        }
    }
}
