//! Edit State Machine
//!
//! One edit command moves through:
//!
//! ```text
//! Received -> Validating -> LockAcquired -> Committed -> Dispatched
//!                  |
//!                  +-> Discarded
//! ```
//!
//! Transitions consume the state and fail on any edge not drawn above.
//! A command that fails mid-way simply stops; redelivery restarts it at
//! `Received`.

use super::errors::{RecoveryError, RecoveryResult};
use crate::store::FailedMessageStatus;

/// Why an edit was dropped without dispatching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// No failure with the requested id exists.
    NotFound,

    /// The failure is no longer unresolved.
    InvalidState { status: FailedMessageStatus },

    /// The failure has no recorded processing attempt to resend.
    NoProcessingAttempts,

    /// A different edit command already owns the failure.
    LockConflict { holder: String },
}

impl DiscardReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::NoProcessingAttempts => "no_processing_attempts",
            Self::LockConflict { .. } => "lock_conflict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Received,
    Validating,
    LockAcquired {
        /// The lock was already held by this same command.
        replay: bool,
    },
    Committed {
        replay: bool,
    },
    Dispatched {
        replay: bool,
    },
    Discarded {
        reason: DiscardReason,
    },
}

impl EditState {
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Validating => "Validating",
            Self::LockAcquired { .. } => "LockAcquired",
            Self::Committed { .. } => "Committed",
            Self::Dispatched { .. } => "Dispatched",
            Self::Discarded { .. } => "Discarded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dispatched { .. } | Self::Discarded { .. })
    }

    pub fn is_replay(&self) -> bool {
        matches!(
            self,
            Self::LockAcquired { replay: true }
                | Self::Committed { replay: true }
                | Self::Dispatched { replay: true }
        )
    }

    /// Received → Validating
    pub fn begin_validation(self) -> RecoveryResult<Self> {
        match self {
            Self::Received => Ok(Self::Validating),
            _ => Err(RecoveryError::forbidden_transition(
                self.state_name(),
                "Validating",
            )),
        }
    }

    /// Validating → LockAcquired
    pub fn acquire_lock(self, replay: bool) -> RecoveryResult<Self> {
        match self {
            Self::Validating => Ok(Self::LockAcquired { replay }),
            _ => Err(RecoveryError::forbidden_transition(
                self.state_name(),
                "LockAcquired",
            )),
        }
    }

    /// Validating → Discarded
    pub fn discard(self, reason: DiscardReason) -> RecoveryResult<Self> {
        match self {
            Self::Validating => Ok(Self::Discarded { reason }),
            _ => Err(RecoveryError::forbidden_transition(
                self.state_name(),
                "Discarded",
            )),
        }
    }

    /// LockAcquired → Committed
    pub fn commit(self) -> RecoveryResult<Self> {
        match self {
            Self::LockAcquired { replay } => Ok(Self::Committed { replay }),
            _ => Err(RecoveryError::forbidden_transition(
                self.state_name(),
                "Committed",
            )),
        }
    }

    /// Committed → Dispatched
    pub fn dispatch(self) -> RecoveryResult<Self> {
        match self {
            Self::Committed { replay } => Ok(Self::Dispatched { replay }),
            _ => Err(RecoveryError::forbidden_transition(
                self.state_name(),
                "Dispatched",
            )),
        }
    }
}
