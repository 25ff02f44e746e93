//! Redirect Table
//!
//! Maps the physical address of a failing endpoint to the address that
//! replaced it. Lookups are single-hop: an entry's target is never looked up
//! again, so a chain `a -> b -> c` resolves `a` to `b`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{RedirectError, RedirectResult};

/// A standing operator-configured redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRedirect {
    /// Deterministic id derived from the from-address.
    pub message_redirect_id: Uuid,

    pub from_physical_address: String,

    pub to_physical_address: String,

    pub last_modified: DateTime<Utc>,
}

impl MessageRedirect {
    /// Create a redirect, validating both addresses.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> RedirectResult<Self> {
        let from = from.into();
        let to = to.into();

        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(RedirectError::Invalid(
                "redirect addresses must not be empty".into(),
            ));
        }
        if from == to {
            return Err(RedirectError::Invalid(format!(
                "redirect from {} to itself",
                from
            )));
        }

        Ok(Self {
            message_redirect_id: redirect_id_for(&from),
            from_physical_address: from,
            to_physical_address: to,
            last_modified: Utc::now(),
        })
    }
}

/// Id of the redirect for a given from-address.
pub fn redirect_id_for(from_physical_address: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, from_physical_address.as_bytes())
}

/// The set of redirects, as loaded from the store.
///
/// `version` increases on every change and lets callers detect a stale copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTable {
    version: u64,
    redirects: BTreeMap<String, MessageRedirect>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list of entries. Later entries for the same
    /// from-address replace earlier ones.
    pub fn from_redirects(redirects: impl IntoIterator<Item = MessageRedirect>) -> Self {
        let mut table = Self::new();
        for redirect in redirects {
            table.upsert(redirect);
        }
        table
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.redirects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redirects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRedirect> {
        self.redirects.values()
    }

    pub fn lookup(&self, address: &str) -> Option<&MessageRedirect> {
        self.redirects.get(address)
    }

    /// Resolve an address through the table, single hop.
    ///
    /// Returns `address` unchanged if no redirect exists for it.
    pub fn resolve<'a>(&'a self, address: &'a str) -> &'a str {
        self.lookup(address)
            .map(|redirect| redirect.to_physical_address.as_str())
            .unwrap_or(address)
    }

    /// Insert or replace the redirect for its from-address.
    pub fn upsert(&mut self, redirect: MessageRedirect) -> Option<MessageRedirect> {
        self.version += 1;
        self.redirects
            .insert(redirect.from_physical_address.clone(), redirect)
    }

    pub fn remove(&mut self, from_physical_address: &str) -> Option<MessageRedirect> {
        let removed = self.redirects.remove(from_physical_address);
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }
}
