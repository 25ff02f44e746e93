//! # Recovery Workflow
//!
//! Edit-and-retry of failed messages: an operator's edit command is turned
//! into exactly one committed state change on the failure and a resent
//! message, no matter how often the command is delivered or how many
//! workflow instances race on the same failure.
//!
//! ```text
//! command -> open session -> validate + claim lock -> commit
//!         -> transform headers -> resolve destination -> dispatch
//! ```

pub mod command;
pub mod destination;
pub mod errors;
mod handler;
pub mod state;

pub use command::{EditAndSendPayload, EditCommand};
pub use destination::{retry_to_override, Destination};
pub use errors::{RecoveryError, RecoveryResult};
pub use handler::{DispatchReport, EditOutcome, RecoveryWorkflow};
pub use state::{DiscardReason, EditState};
