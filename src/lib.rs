//! aeroretry - edit and resend failed messages, exactly once per edit
//!
//! The mechanics of one edit-and-retry operation: validate the failure,
//! claim it through the store's edit lock, commit, rebuild the envelope,
//! resolve the destination through standing redirects, dispatch.

pub mod cancel;
pub mod config;
pub mod headers;
pub mod host;
pub mod observability;
pub mod redirects;
pub mod store;
pub mod transport;
pub mod workflow;

pub use cancel::{CancelHandle, CancelSignal};
pub use config::RecoveryConfig;
pub use workflow::{EditCommand, EditOutcome, RecoveryError, RecoveryWorkflow};
