//! # Redirect Table
//!
//! Standing operator redirects from a failing endpoint's physical address to
//! a replacement address, and the stores they are loaded from.
//!
//! From the recovery workflow's point of view the table is read-only; it is
//! maintained by whoever administers redirects.

pub mod errors;
pub mod file;
pub mod store;
pub mod table;

pub use errors::{RedirectError, RedirectResult};
pub use file::FileRedirectStore;
pub use store::{CachedRedirectStore, InMemoryRedirectStore, RedirectFuture, RedirectStore};
pub use table::{redirect_id_for, MessageRedirect, RedirectTable};
