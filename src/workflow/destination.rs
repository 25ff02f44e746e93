//! Destination resolution
//!
//! The failing endpoint's address goes through the redirect table first.
//! A retry-to override then swaps roles: the message is sent to the
//! override address and the redirected address travels along in the
//! target-endpoint header.

use crate::headers::names::{RETRY_TO, TARGET_ENDPOINT_ADDRESS};
use crate::headers::Headers;
use crate::redirects::RedirectTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Where the message is dispatched.
    pub address: String,
    /// Redirected failing-endpoint address, set only when an override is honoured.
    pub target_endpoint: Option<String>,
    /// The failing-endpoint address matched a redirect.
    pub redirected: bool,
}

impl Destination {
    pub fn resolve(failing_address: &str, redirects: &RedirectTable, retry_to: Option<&str>) -> Self {
        let resolved = redirects.resolve(failing_address);
        let redirected = resolved != failing_address;

        match retry_to {
            Some(override_address) => Self {
                address: override_address.to_string(),
                target_endpoint: Some(resolved.to_string()),
                redirected,
            },
            None => Self {
                address: resolved.to_string(),
                target_endpoint: None,
                redirected,
            },
        }
    }

    pub fn is_override(&self) -> bool {
        self.target_endpoint.is_some()
    }

    /// Write the target-endpoint header when an override is in effect.
    pub fn stamp(&self, headers: &mut Headers) {
        if let Some(target) = &self.target_endpoint {
            headers.insert(TARGET_ENDPOINT_ADDRESS.to_string(), target.clone());
        }
    }
}

/// Find the retry-to override: the edited headers win, the headers of the
/// last failed attempt are the fallback. Blank values are ignored.
pub fn retry_to_override<'a>(edited: &'a Headers, last_attempt: &'a Headers) -> Option<&'a str> {
    [edited, last_attempt]
        .into_iter()
        .filter_map(|headers| headers.get(RETRY_TO))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}
