//! Edit lock
//!
//! The lock is a document stored next to the failed message record holding
//! the id of the one edit command allowed to resend that failure. It is
//! written in the same commit as the status change, so it can never be held
//! without the record having been resolved by the same command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of the edit lock for one failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditLock {
    /// No edit has claimed the failure.
    #[default]
    Absent,

    /// The named edit command owns the failure.
    HeldBy {
        command_id: String,
        acquired_at: DateTime<Utc>,
    },
}

/// Outcome of presenting a command to the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockClaim {
    /// Nobody holds the lock; the command may take it.
    Acquire,

    /// The command already holds the lock: this is a redelivery.
    Replay,

    /// A different command holds the lock.
    Conflict { holder: String },
}

impl EditLock {
    pub fn held_by(command_id: impl Into<String>) -> Self {
        EditLock::HeldBy {
            command_id: command_id.into(),
            acquired_at: Utc::now(),
        }
    }

    pub fn holder(&self) -> Option<&str> {
        match self {
            EditLock::Absent => None,
            EditLock::HeldBy { command_id, .. } => Some(command_id),
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self, EditLock::HeldBy { .. })
    }

    /// Decide what `command_id` may do with this lock.
    pub fn claim(&self, command_id: &str) -> LockClaim {
        match self {
            EditLock::Absent => LockClaim::Acquire,
            EditLock::HeldBy { command_id: holder, .. } if holder == command_id => {
                LockClaim::Replay
            }
            EditLock::HeldBy { command_id: holder, .. } => LockClaim::Conflict {
                holder: holder.clone(),
            },
        }
    }
}
