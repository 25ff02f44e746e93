//! Recovery lifecycle events
//!
//! Every decision the recovery workflow takes is reported as one of these.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryEvent {
    /// Edit command accepted for processing
    EditReceived,
    /// Edit command payload could not be decoded
    EditRejectedInvalid,

    // Discards
    /// Target failure does not exist
    EditDiscardedNotFound,
    /// Target failure is not unresolved
    EditDiscardedInvalidState,
    /// Another edit command owns the failure
    EditDiscardedLockConflict,

    // Session
    /// Edit session could not be opened
    SessionOpenFailed,
    /// This command took the edit lock
    EditLockAcquired,
    /// Redelivery of the command that holds the lock
    EditReplayDetected,
    /// Record and lock durably written
    EditCommitted,
    /// Concurrent writer detected at commit
    EditCommitConflict,

    // Outgoing message
    /// Reply-to header rebuilt or requalified
    ReplyToRepaired,
    /// Destination replaced by a redirect
    RedirectApplied,
    /// Redirect table could not be loaded
    RedirectLoadFailed,
    /// Retry-to override honoured
    RetryToOverride,

    // Dispatch
    /// Message handed to the transport
    EditDispatched,
    /// Transport rejected the message
    EditDispatchFailed,

    /// Cancellation observed at a session boundary
    EditCancelled,
}

impl RecoveryEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryEvent::EditReceived => "EDIT_RECEIVED",
            RecoveryEvent::EditRejectedInvalid => "EDIT_REJECTED_INVALID",
            RecoveryEvent::EditDiscardedNotFound => "EDIT_DISCARDED_NOT_FOUND",
            RecoveryEvent::EditDiscardedInvalidState => "EDIT_DISCARDED_INVALID_STATE",
            RecoveryEvent::EditDiscardedLockConflict => "EDIT_DISCARDED_LOCK_CONFLICT",
            RecoveryEvent::SessionOpenFailed => "SESSION_OPEN_FAILED",
            RecoveryEvent::EditLockAcquired => "EDIT_LOCK_ACQUIRED",
            RecoveryEvent::EditReplayDetected => "EDIT_REPLAY_DETECTED",
            RecoveryEvent::EditCommitted => "EDIT_COMMITTED",
            RecoveryEvent::EditCommitConflict => "EDIT_COMMIT_CONFLICT",
            RecoveryEvent::ReplyToRepaired => "REPLY_TO_REPAIRED",
            RecoveryEvent::RedirectApplied => "REDIRECT_APPLIED",
            RecoveryEvent::RedirectLoadFailed => "REDIRECT_LOAD_FAILED",
            RecoveryEvent::RetryToOverride => "RETRY_TO_OVERRIDE",
            RecoveryEvent::EditDispatched => "EDIT_DISPATCHED",
            RecoveryEvent::EditDispatchFailed => "EDIT_DISPATCH_FAILED",
            RecoveryEvent::EditCancelled => "EDIT_CANCELLED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RecoveryEvent::EditDiscardedNotFound
            | RecoveryEvent::EditDiscardedInvalidState
            | RecoveryEvent::EditDiscardedLockConflict
            | RecoveryEvent::EditCommitConflict
            | RecoveryEvent::EditCancelled => Severity::Warn,
            RecoveryEvent::EditRejectedInvalid
            | RecoveryEvent::SessionOpenFailed
            | RecoveryEvent::RedirectLoadFailed
            | RecoveryEvent::EditDispatchFailed => Severity::Error,
            RecoveryEvent::ReplyToRepaired | RecoveryEvent::RedirectApplied => Severity::Trace,
            _ => Severity::Info,
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(
            self,
            RecoveryEvent::EditDiscardedNotFound
                | RecoveryEvent::EditDiscardedInvalidState
                | RecoveryEvent::EditDiscardedLockConflict
        )
    }
}

impl fmt::Display for RecoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
