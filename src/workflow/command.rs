//! Edit-and-send command
//!
//! On the wire the body is base64 so arbitrary payload bytes survive JSON.
//! The command id is the id of the transport message that carried the
//! command; redeliveries carry the same id.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::errors::{RecoveryError, RecoveryResult};
use crate::headers::Headers;

/// Payload of an edit-and-send command as sent by operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditAndSendPayload {
    pub failed_message_id: String,

    #[serde(default)]
    pub new_headers: Headers,

    /// Base64-encoded body
    pub new_body: String,
}

impl EditAndSendPayload {
    pub fn new(failed_message_id: impl Into<String>, new_headers: Headers, body: &[u8]) -> Self {
        Self {
            failed_message_id: failed_message_id.into(),
            new_headers,
            new_body: STANDARD.encode(body),
        }
    }
}

/// A decoded edit command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommand {
    pub command_id: String,
    pub failed_message_id: String,
    pub new_headers: Headers,
    pub new_body: Vec<u8>,
}

impl EditCommand {
    pub fn new(
        command_id: impl Into<String>,
        failed_message_id: impl Into<String>,
        new_headers: Headers,
        new_body: Vec<u8>,
    ) -> Self {
        Self {
            command_id: command_id.into(),
            failed_message_id: failed_message_id.into(),
            new_headers,
            new_body,
        }
    }

    pub fn from_wire(command_id: &str, payload: &EditAndSendPayload) -> RecoveryResult<Self> {
        if command_id.trim().is_empty() {
            return Err(RecoveryError::InvalidCommand("command id is empty".into()));
        }
        if payload.failed_message_id.trim().is_empty() {
            return Err(RecoveryError::InvalidCommand(
                "failed message id is empty".into(),
            ));
        }

        let new_body = STANDARD
            .decode(payload.new_body.trim())
            .map_err(|e| RecoveryError::InvalidCommand(format!("body is not base64: {}", e)))?;

        Ok(Self {
            command_id: command_id.to_string(),
            failed_message_id: payload.failed_message_id.clone(),
            new_headers: payload.new_headers.clone(),
            new_body,
        })
    }

    pub fn from_json(command_id: &str, json: &str) -> RecoveryResult<Self> {
        let payload: EditAndSendPayload = serde_json::from_str(json)
            .map_err(|e| RecoveryError::InvalidCommand(format!("malformed payload: {}", e)))?;
        Self::from_wire(command_id, &payload)
    }
}
