//! Reply-to header repair
//!
//! A resent message must carry a reply-to address replies can actually be
//! routed to. Two kinds of damage are repaired:
//!
//! - **Missing or malformed**: the header is absent, blank, or not of the
//!   form `queue` / `queue@machine`. It is rebuilt as `queue@<this host>`.
//! - **Requalified by the recovery host**: `queue@<this host>` while the
//!   message originated on another machine. The machine part is put back to
//!   the originating machine and the damaged value is kept aside.
//!
//! Repair never fails: when no queue name can be salvaged the configured
//! default reply queue is used.

use std::sync::OnceLock;

use regex::Regex;

use super::names::{
    Headers, OLD_REPLY_TO_ADDRESS, ORIGINATING_ENDPOINT, ORIGINATING_MACHINE, REPLY_TO_ADDRESS,
};

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+(@[^@\s]+)?$").expect("reply-to address pattern is valid")
    })
}

/// Returns true for `queue` or `queue@machine` with no blanks and non-empty parts.
pub fn is_well_formed_address(address: &str) -> bool {
    address_pattern().is_match(address)
}

/// Returns true for a bare machine name: no blanks and no `@`.
pub fn is_machine_name(name: &str) -> bool {
    is_well_formed_address(name) && !name.contains('@')
}

/// What the repair did to the reply-to header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyToRepair {
    /// Header was usable as-is.
    Unchanged,

    /// Header was missing or malformed and has been rebuilt.
    Replaced {
        previous: Option<String>,
        repaired: String,
    },

    /// Header pointed at this host instead of the originating machine.
    Requalified { previous: String, repaired: String },
}

impl ReplyToRepair {
    /// Returns true if the header set was modified.
    pub fn is_repaired(&self) -> bool {
        !matches!(self, ReplyToRepair::Unchanged)
    }
}

/// Repairs reply-to headers relative to the host running the recovery workflow.
#[derive(Debug, Clone)]
pub struct ReplyToStrategy {
    machine_name: String,
    default_reply_queue: String,
}

impl ReplyToStrategy {
    pub fn new(machine_name: impl Into<String>, default_reply_queue: impl Into<String>) -> Self {
        Self {
            machine_name: machine_name.into(),
            default_reply_queue: default_reply_queue.into(),
        }
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    /// Repair the reply-to header in place.
    pub fn repair(&self, headers: &mut Headers) -> ReplyToRepair {
        match headers.get(REPLY_TO_ADDRESS).cloned() {
            None => self.replace(headers, None),
            Some(address) if !is_well_formed_address(&address) => {
                self.replace(headers, Some(address))
            }
            Some(address) => self.requalify(headers, address),
        }
    }

    fn replace(&self, headers: &mut Headers, previous: Option<String>) -> ReplyToRepair {
        let queue = self.salvage_queue(previous.as_deref(), headers);
        let repaired = format!("{}@{}", queue, self.machine_name);

        if let Some(previous) = &previous {
            headers.insert(OLD_REPLY_TO_ADDRESS.to_string(), previous.clone());
        }
        headers.insert(REPLY_TO_ADDRESS.to_string(), repaired.clone());

        ReplyToRepair::Replaced { previous, repaired }
    }

    fn requalify(&self, headers: &mut Headers, address: String) -> ReplyToRepair {
        let Some((queue, machine)) = address.split_once('@') else {
            return ReplyToRepair::Unchanged;
        };
        let Some(originating) = headers.get(ORIGINATING_MACHINE) else {
            return ReplyToRepair::Unchanged;
        };

        let points_here = machine.eq_ignore_ascii_case(&self.machine_name);
        let originated_elsewhere =
            !originating.eq_ignore_ascii_case(&self.machine_name) && is_machine_name(originating);
        if !points_here || !originated_elsewhere {
            return ReplyToRepair::Unchanged;
        }

        let repaired = format!("{}@{}", queue, originating);
        headers.insert(OLD_REPLY_TO_ADDRESS.to_string(), address.clone());
        headers.insert(REPLY_TO_ADDRESS.to_string(), repaired.clone());

        ReplyToRepair::Requalified {
            previous: address,
            repaired,
        }
    }

    /// Queue part of the damaged value, else the originating endpoint, else the default.
    fn salvage_queue(&self, previous: Option<&str>, headers: &Headers) -> String {
        previous
            .and_then(|address| address.split('@').next())
            .map(str::trim)
            .filter(|queue| is_well_formed_address(queue))
            .or_else(|| {
                headers
                    .get(ORIGINATING_ENDPOINT)
                    .map(|endpoint| endpoint.trim())
                    .filter(|endpoint| is_well_formed_address(endpoint) && !endpoint.contains('@'))
            })
            .unwrap_or(&self.default_reply_queue)
            .to_string()
    }
}
