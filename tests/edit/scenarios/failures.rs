//! Collaborator failures.

use std::sync::Arc;

use aeroretry::observability::{RecoveryEvent, RecoveryLog};
use aeroretry::redirects::{
    RedirectError, RedirectFuture, RedirectResult, RedirectStore, RedirectTable,
};
use aeroretry::store::{
    EditSession, EditStore, FailedMessageStatus, SessionFuture, StoreError, StoreResult,
};
use aeroretry::workflow::{EditOutcome, RecoveryError, RecoveryWorkflow};

use crate::edit::*;

struct UnavailableStore;

impl EditStore for UnavailableStore {
    fn open_edit_session<'a>(&'a self, _failed_message_id: &'a str) -> SessionFuture<'a> {
        Box::pin(async {
            let result: StoreResult<Box<dyn EditSession>> =
                Err(StoreError::Unavailable("connection refused".into()));
            result
        })
    }
}

struct BrokenRedirects(RedirectError);

impl RedirectStore for BrokenRedirects {
    fn get_or_create(&self) -> RedirectFuture<'_> {
        let result: RedirectResult<Arc<RedirectTable>> = Err(self.0.clone());
        Box::pin(async move { result })
    }
}

#[tokio::test]
async fn test_session_open_failure_is_retryable() {
    let harness = Harness::seeded();
    let workflow = harness.workflow_over(UnavailableStore);

    let err = workflow.handle_edit_and_send(&command("cmd-1")).await.unwrap_err();

    assert!(matches!(err, RecoveryError::Store(StoreError::Unavailable(_))));
    assert!(err.is_retryable());
    assert_eq!(harness.dispatcher.call_count(), 0);
    assert!(harness.log.contains(RecoveryEvent::SessionOpenFailed));
}

#[tokio::test]
async fn test_transport_failure_after_commit() {
    let harness = Harness::seeded();
    harness.redirect(FAILING_ADDRESS, "sales@web-02");
    let workflow = harness.workflow();
    harness.dispatcher.fail_next(1);

    let err = workflow.handle_edit_and_send(&command("cmd-1")).await.unwrap_err();

    let RecoveryError::Transport { destination, .. } = &err else {
        panic!("expected transport error, got {:?}", err);
    };
    assert_eq!(destination, "sales@web-02");
    assert!(err.is_retryable());
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Resolved)
    );
    assert_eq!(workflow.metrics().snapshot().transport_failures, 1);
    assert!(harness.log.contains(RecoveryEvent::EditDispatchFailed));
    assert!(!harness.log.contains(RecoveryEvent::EditDispatched));
}

#[tokio::test]
async fn test_redirect_load_failure_after_commit() {
    let harness = Harness::seeded();
    let broken = RecoveryWorkflow::new(
        harness.store.clone(),
        BrokenRedirects(RedirectError::Unavailable("store offline".into())),
        Arc::clone(&harness.dispatcher),
        header_transform(),
        Arc::clone(&harness.log) as Arc<dyn RecoveryLog>,
    );

    let err = broken.handle_edit_and_send(&command("cmd-1")).await.unwrap_err();

    assert!(matches!(err, RecoveryError::Redirects(_)));
    assert!(err.is_retryable());
    assert_eq!(harness.dispatcher.call_count(), 0);
    assert!(harness.log.contains(RecoveryEvent::RedirectLoadFailed));
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Resolved)
    );

    let outcome = harness
        .workflow()
        .handle_edit_and_send(&command("cmd-1"))
        .await
        .unwrap();
    let EditOutcome::Dispatched(report) = outcome else {
        panic!("redelivery must dispatch");
    };
    assert!(report.replay);
}

#[tokio::test]
async fn test_corrupt_redirects_are_not_retryable() {
    let harness = Harness::seeded();
    let broken = RecoveryWorkflow::new(
        harness.store.clone(),
        BrokenRedirects(RedirectError::Corrupt("unexpected EOF".into())),
        Arc::clone(&harness.dispatcher),
        header_transform(),
        Arc::clone(&harness.log) as Arc<dyn RecoveryLog>,
    );

    let err = broken.handle_edit_and_send(&command("cmd-1")).await.unwrap_err();

    assert!(!err.is_retryable());
}
