//! # Transport Errors

use thiserror::Error;

/// Result type for dispatch operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Dispatch failures. All of them leave the message undelivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Nothing is listening on the destination address
    #[error("Destination unreachable: {0}")]
    Unreachable(String),

    /// Destination address cannot be used by the transport
    #[error("Invalid destination address: {0}")]
    InvalidAddress(String),

    /// Transport refused or lost the send
    #[error("Send failed: {0}")]
    SendFailed(String),
}
