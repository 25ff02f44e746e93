//! Cancellation at session boundaries.

use std::sync::Arc;

use aeroretry::store::{
    CommitFuture, EditLock, EditSession, EditStore, FailedMessageRecord, FailedMessageStatus,
    InMemoryEditStore, SessionFuture,
};
use aeroretry::workflow::{EditOutcome, RecoveryError};
use aeroretry::{CancelHandle, CancelSignal};

use crate::edit::*;

#[derive(Clone, Copy)]
enum CancelPoint {
    AfterOpen,
    AfterCommit,
}

/// Trips the cancel handle at a chosen point inside the session.
struct CancellingStore {
    inner: InMemoryEditStore,
    handle: Arc<CancelHandle>,
    at: CancelPoint,
}

struct CancellingSession {
    inner: Box<dyn EditSession>,
    handle: Arc<CancelHandle>,
    at: CancelPoint,
}

impl EditStore for CancellingStore {
    fn open_edit_session<'a>(&'a self, failed_message_id: &'a str) -> SessionFuture<'a> {
        Box::pin(async move {
            let inner = self.inner.open_edit_session(failed_message_id).await?;
            if let CancelPoint::AfterOpen = self.at {
                self.handle.cancel();
            }
            let session: Box<dyn EditSession> = Box::new(CancellingSession {
                inner,
                handle: Arc::clone(&self.handle),
                at: self.at,
            });
            Ok(session)
        })
    }
}

impl EditSession for CancellingSession {
    fn failed_message_id(&self) -> &str {
        self.inner.failed_message_id()
    }

    fn get_failed_message(&self) -> Option<&FailedMessageRecord> {
        self.inner.get_failed_message()
    }

    fn get_current_edit_lock(&self) -> &EditLock {
        self.inner.get_current_edit_lock()
    }

    fn set_current_edit_lock(&mut self, command_id: &str) {
        self.inner.set_current_edit_lock(command_id)
    }

    fn mark_resolved(&mut self) {
        self.inner.mark_resolved()
    }

    fn has_staged_changes(&self) -> bool {
        self.inner.has_staged_changes()
    }

    fn commit(self: Box<Self>) -> CommitFuture {
        let CancellingSession { inner, handle, at } = *self;
        Box::pin(async move {
            let result = inner.commit().await;
            if let CancelPoint::AfterCommit = at {
                handle.cancel();
            }
            result
        })
    }
}

fn cancelling(harness: &Harness, at: CancelPoint) -> (CancellingStore, CancelSignal) {
    let (handle, signal) = CancelHandle::channel();
    let store = CancellingStore {
        inner: harness.store.clone(),
        handle: Arc::new(handle),
        at,
    };
    (store, signal)
}

#[tokio::test]
async fn test_cancelled_before_start_opens_nothing() {
    let harness = Harness::seeded();
    let (handle, signal) = CancelHandle::channel();
    handle.cancel();

    let err = harness
        .workflow()
        .handle_edit_and_send_with_cancel(&command("cmd-1"), &signal)
        .await
        .unwrap_err();

    assert!(matches!(err, RecoveryError::Cancelled { committed: false }));
    assert_eq!(harness.store.open_session_count(), 0);
    assert_eq!(harness.store.commit_count(), 0);
}

#[tokio::test]
async fn test_cancelled_before_commit_applies_nothing() {
    let harness = Harness::seeded();
    let (store, signal) = cancelling(&harness, CancelPoint::AfterOpen);
    let workflow = harness.workflow_over(store);

    let err = workflow
        .handle_edit_and_send_with_cancel(&command("cmd-1"), &signal)
        .await
        .unwrap_err();

    assert!(matches!(err, RecoveryError::Cancelled { committed: false }));
    assert!(err.is_retryable());
    assert_eq!(harness.store.edit_lock(FAILED_MESSAGE_ID), EditLock::Absent);
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Unresolved)
    );
    assert_eq!(harness.store.open_session_count(), 0);
    assert_eq!(harness.dispatcher.call_count(), 0);

    let outcome = harness
        .workflow()
        .handle_edit_and_send(&command("cmd-1"))
        .await
        .unwrap();
    let EditOutcome::Dispatched(report) = outcome else {
        panic!("redelivery must dispatch");
    };
    assert!(!report.replay);
}

#[tokio::test]
async fn test_cancelled_after_commit_is_safe_to_redeliver() {
    let harness = Harness::seeded();
    let (store, signal) = cancelling(&harness, CancelPoint::AfterCommit);
    let workflow = harness.workflow_over(store);

    let err = workflow
        .handle_edit_and_send_with_cancel(&command("cmd-1"), &signal)
        .await
        .unwrap_err();

    assert!(matches!(err, RecoveryError::Cancelled { committed: true }));
    assert!(err.is_retryable());
    assert_eq!(harness.dispatcher.call_count(), 0);
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Resolved)
    );
    assert_eq!(workflow.metrics().snapshot().cancellations, 1);

    let outcome = harness
        .workflow()
        .handle_edit_and_send(&command("cmd-1"))
        .await
        .unwrap();
    let EditOutcome::Dispatched(report) = outcome else {
        panic!("redelivery must dispatch");
    };
    assert!(report.replay);
    assert_eq!(harness.dispatcher.sent().len(), 1);
}
