//! Well-known header names
//!
//! These keys are part of the message envelope contract shared with the
//! endpoints; they must match byte-for-byte what the endpoints emit.

/// Message header map. Ordered so that logs and comparisons are deterministic.
pub type Headers = std::collections::BTreeMap<String, String>;

pub const MESSAGE_ID: &str = "NServiceBus.MessageId";
pub const REPLY_TO_ADDRESS: &str = "NServiceBus.ReplyToAddress";
pub const ORIGINATING_MACHINE: &str = "NServiceBus.OriginatingMachine";
pub const ORIGINATING_ENDPOINT: &str = "NServiceBus.OriginatingEndpoint";

/// Links an edited message back to the failure it was produced from.
pub const EDIT_OF: &str = "ServiceControl.EditOf";

/// Operator override: deliver to this address instead of the failing endpoint.
pub const RETRY_TO: &str = "ServiceControl.RetryTo";

/// Stamped when `RETRY_TO` is honoured, carrying the real destination.
pub const TARGET_ENDPOINT_ADDRESS: &str = "ServiceControl.TargetEndpointAddress";

/// Left behind by the staged-retry protocol; refers to a retry session that is gone.
pub const RETRY_ACKNOWLEDGEMENT_QUEUE: &str = "ServiceControl.Retry.AcknowledgementQueue";

/// Previous reply-to value, kept when a corrupted reply-to header is requalified.
pub const OLD_REPLY_TO_ADDRESS: &str = "ServiceControl.OldReplyToAddress";
