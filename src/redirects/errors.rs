//! # Redirect Errors

use thiserror::Error;

/// Result type for redirect store operations
pub type RedirectResult<T> = Result<T, RedirectError>;

/// Redirect store errors
#[derive(Debug, Clone, Error)]
pub enum RedirectError {
    #[error("Redirect store I/O error: {0}")]
    Io(String),

    #[error("Redirect document is corrupt: {0}")]
    Corrupt(String),

    #[error("Redirect store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid redirect: {0}")]
    Invalid(String),
}

impl RedirectError {
    /// Transient errors may succeed when the operation is repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, RedirectError::Io(_) | RedirectError::Unavailable(_))
    }
}
