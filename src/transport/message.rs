//! Outgoing message

use uuid::Uuid;

use crate::headers::Headers;

/// A message built for one dispatch. Owned by the workflow until it is
/// handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub id: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl OutgoingMessage {
    pub fn new(id: impl Into<String>, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            headers,
            body,
        }
    }

    /// Fresh message id, distinct from any id the message was derived from.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
