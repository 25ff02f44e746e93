//! Edit session contract
//!
//! An edit session is a scoped unit of work over one failure: the record and
//! its edit lock are read when the session opens, changes are staged locally,
//! and `commit` applies them all or none. Commit is a compare-and-swap on the
//! version the session read; if anything else committed to the same failure
//! in between, the commit fails with `StoreError::CommitConflict`.
//!
//! Dropping a session without committing discards the staged changes.
//! Implementations release their underlying resources on drop, so every exit
//! path of the caller releases the session.

use std::future::Future;
use std::pin::Pin;

use super::errors::StoreResult;
use super::lock::EditLock;
use super::record::FailedMessageRecord;

/// Future returned by [`EditStore::open_edit_session`].
pub type SessionFuture<'a> =
    Pin<Box<dyn Future<Output = StoreResult<Box<dyn EditSession>>> + Send + 'a>>;

/// Future returned by [`EditSession::commit`].
pub type CommitFuture = Pin<Box<dyn Future<Output = StoreResult<()>> + Send>>;

/// Session factory provided by the failed-message store.
pub trait EditStore: Send + Sync {
    /// Open a session scoped to one failure.
    fn open_edit_session<'a>(&'a self, failed_message_id: &'a str) -> SessionFuture<'a>;
}

impl<S: EditStore + ?Sized> EditStore for std::sync::Arc<S> {
    fn open_edit_session<'a>(&'a self, failed_message_id: &'a str) -> SessionFuture<'a> {
        (**self).open_edit_session(failed_message_id)
    }
}

/// Atomic read/compare/write access to one failure and its edit lock.
pub trait EditSession: Send {
    /// The failure this session is scoped to.
    fn failed_message_id(&self) -> &str;

    /// The record, or `None` if no such failure exists.
    fn get_failed_message(&self) -> Option<&FailedMessageRecord>;

    /// Current edit lock, including changes staged in this session.
    fn get_current_edit_lock(&self) -> &EditLock;

    /// Stage the edit lock for `command_id`.
    fn set_current_edit_lock(&mut self, command_id: &str);

    /// Stage the transition `Unresolved -> Resolved`. No-op for any other status.
    fn mark_resolved(&mut self);

    fn has_staged_changes(&self) -> bool;

    /// Atomically persist the staged changes. Consumes the session.
    fn commit(self: Box<Self>) -> CommitFuture;
}
