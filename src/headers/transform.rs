//! Header Transform
//!
//! Produces the header set of a resent message from the operator-supplied
//! (untrusted) headers. Pure: the only inputs are the supplied headers, the
//! new message id, the failure id and the host identity captured in the
//! reply-to strategy. Malformed input is repaired, never rejected.

use super::filter::remove_error_context_headers;
use super::names::{Headers, EDIT_OF, MESSAGE_ID, RETRY_ACKNOWLEDGEMENT_QUEUE};
use super::reply_to::{ReplyToRepair, ReplyToStrategy};

/// Result of transforming a header set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedHeaders {
    pub headers: Headers,
    /// What happened to the reply-to header, for logging.
    pub reply_to: ReplyToRepair,
}

#[derive(Debug, Clone)]
pub struct HeaderTransform {
    reply_to: ReplyToStrategy,
}

impl HeaderTransform {
    pub fn new(reply_to: ReplyToStrategy) -> Self {
        Self { reply_to }
    }

    /// Build the outgoing header set.
    ///
    /// - error-context headers are dropped
    /// - the reply-to header is repaired
    /// - the acknowledgement-queue header of a previous retry round is dropped
    /// - the message id is set to `message_id`, overwriting any supplied value
    /// - the link header is set to `failed_message_id`
    pub fn apply(
        &self,
        supplied: &Headers,
        message_id: &str,
        failed_message_id: &str,
    ) -> TransformedHeaders {
        let mut headers = remove_error_context_headers(supplied);
        let reply_to = self.reply_to.repair(&mut headers);

        headers.remove(RETRY_ACKNOWLEDGEMENT_QUEUE);
        headers.insert(MESSAGE_ID.to_string(), message_id.to_string());
        headers.insert(EDIT_OF.to_string(), failed_message_id.to_string());

        TransformedHeaders { headers, reply_to }
    }
}
