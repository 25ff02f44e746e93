//! # Store Errors

use thiserror::Error;

/// Result type for edit store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Edit store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The document changed after the session read it.
    #[error("Commit conflict on {id}: session read version {expected} but store is at {actual}")]
    CommitConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// The store cannot be reached or its state is unusable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::CommitConflict { .. })
    }
}
