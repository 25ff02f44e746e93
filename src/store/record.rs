//! Failed message records
//!
//! A record is created by the ingestion pipeline when a message first fails
//! and accumulates one processing attempt per failure of that message. The
//! recovery workflow only ever moves it from `Unresolved` to `Resolved`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::headers::Headers;

/// Lifecycle status of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailedMessageStatus {
    Unresolved,
    Resolved,
    Archived,
}

impl FailedMessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailedMessageStatus::Unresolved => "Unresolved",
            FailedMessageStatus::Resolved => "Resolved",
            FailedMessageStatus::Archived => "Archived",
        }
    }
}

impl fmt::Display for FailedMessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetails {
    /// Physical address of the endpoint that failed to process the message.
    pub address_of_failing_endpoint: String,

    pub reason: String,

    pub time_of_failure: DateTime<Utc>,
}

/// One failed processing attempt of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingAttempt {
    pub message_id: String,

    /// Headers as they were when the attempt failed.
    pub headers: Headers,

    pub failure: FailureDetails,
}

impl ProcessingAttempt {
    pub fn new(
        message_id: impl Into<String>,
        address_of_failing_endpoint: impl Into<String>,
        headers: Headers,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            headers,
            failure: FailureDetails {
                address_of_failing_endpoint: address_of_failing_endpoint.into(),
                reason: reason.into(),
                time_of_failure: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedMessageRecord {
    /// Id of the failure, not of the message.
    pub id: String,

    pub status: FailedMessageStatus,

    /// Oldest first; the last attempt is authoritative.
    pub processing_attempts: Vec<ProcessingAttempt>,
}

impl FailedMessageRecord {
    /// Create an unresolved record from its first failed attempt.
    pub fn new(id: impl Into<String>, first_attempt: ProcessingAttempt) -> Self {
        Self {
            id: id.into(),
            status: FailedMessageStatus::Unresolved,
            processing_attempts: vec![first_attempt],
        }
    }

    pub fn with_status(mut self, status: FailedMessageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn add_attempt(&mut self, attempt: ProcessingAttempt) {
        self.processing_attempts.push(attempt);
    }

    pub fn last_attempt(&self) -> Option<&ProcessingAttempt> {
        self.processing_attempts.last()
    }

    /// Only unresolved failures may be edited.
    pub fn is_editable(&self) -> bool {
        self.status == FailedMessageStatus::Unresolved
    }
}
