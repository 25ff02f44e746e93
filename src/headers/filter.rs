//! Error-context header filter
//!
//! Headers describing the original failure (exception details, failed queue,
//! retry counters) must never travel with a freshly dispatched message:
//! the receiving endpoint would treat it as a failure replay.

use super::names::Headers;

/// Exact header names that carry failure context.
const ERROR_CONTEXT_KEYS: &[&str] = &[
    "NServiceBus.FailedQ",
    "NServiceBus.TimeOfFailure",
    "NServiceBus.Retries",
    "NServiceBus.Retries.Timestamp",
    "NServiceBus.FLRetries",
    "NServiceBus.ProcessingFailed",
];

/// Every header under this prefix is exception detail.
const ERROR_CONTEXT_PREFIX: &str = "NServiceBus.ExceptionInfo.";

/// Returns true if the header describes the original failure.
pub fn is_error_context_header(name: &str) -> bool {
    ERROR_CONTEXT_KEYS.contains(&name) || name.starts_with(ERROR_CONTEXT_PREFIX)
}

/// Copy `headers`, leaving out every error-context entry.
pub fn remove_error_context_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .filter(|(name, _)| !is_error_context_header(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
