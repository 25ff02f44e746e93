//! Host identity
//!
//! The machine name of the host running the recovery workflow. Used to
//! rebuild reply-to addresses of resent messages.

use std::env;

use crate::headers::is_machine_name;

pub trait HostIdentity: Send + Sync {
    fn machine_name(&self) -> String;
}

/// A fixed, configured machine name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHostIdentity {
    machine_name: String,
}

impl StaticHostIdentity {
    pub fn new(machine_name: impl Into<String>) -> Self {
        Self {
            machine_name: machine_name.into(),
        }
    }
}

impl HostIdentity for StaticHostIdentity {
    fn machine_name(&self) -> String {
        self.machine_name.clone()
    }
}

/// Machine name from the environment (`HOSTNAME`, then `COMPUTERNAME`),
/// falling back to `localhost`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostIdentity;

const FALLBACK_MACHINE_NAME: &str = "localhost";

impl SystemHostIdentity {
    /// First usable machine name among `lookup("HOSTNAME")` and
    /// `lookup("COMPUTERNAME")`, else the fallback.
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> String {
        ["HOSTNAME", "COMPUTERNAME"]
            .iter()
            .filter_map(|key| lookup(*key))
            .map(|name| name.trim().to_string())
            .find(|name| is_machine_name(name))
            .unwrap_or_else(|| FALLBACK_MACHINE_NAME.to_string())
    }
}

impl HostIdentity for SystemHostIdentity {
    fn machine_name(&self) -> String {
        Self::resolve(|key| env::var(key).ok())
    }
}
