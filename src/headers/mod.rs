//! # Header Transform
//!
//! Sanitizes and rewrites the header set of a failed message before it is
//! dispatched again. Nothing in this module performs I/O.

mod filter;
pub mod names;
mod reply_to;
mod transform;

pub use filter::{is_error_context_header, remove_error_context_headers};
pub use names::Headers;
pub use reply_to::{is_machine_name, is_well_formed_address, ReplyToRepair, ReplyToStrategy};
pub use transform::{HeaderTransform, TransformedHeaders};
