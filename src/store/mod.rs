//! # Edit Session Store
//!
//! The contract the recovery workflow consumes from the failed-message store,
//! plus an in-memory implementation with optimistic concurrency.
//!
//! The store is the only place where state shared between workflow instances
//! lives; mutual exclusion between concurrent edits of the same failure is
//! provided by the version check on commit, not by in-process locking.

pub mod errors;
pub mod lock;
pub mod memory;
pub mod record;
pub mod session;

pub use errors::{StoreError, StoreResult};
pub use lock::{EditLock, LockClaim};
pub use memory::InMemoryEditStore;
pub use record::{FailedMessageRecord, FailedMessageStatus, FailureDetails, ProcessingAttempt};
pub use session::{CommitFuture, EditSession, EditStore, SessionFuture};
