//! Racing edits on the same failure.

use std::sync::Arc;

use aeroretry::observability::RecoveryEvent;
use aeroretry::store::{EditLock, FailedMessageStatus};
use aeroretry::workflow::{DiscardReason, EditOutcome, RecoveryError};

use crate::edit::*;

#[tokio::test]
async fn test_commit_conflict_aborts_without_dispatch() {
    let harness = Harness::seeded();
    let workflow = harness.workflow();
    harness.store.interfere_before_next_commit(FAILED_MESSAGE_ID);

    let err = workflow.handle_edit_and_send(&command("cmd-1")).await.unwrap_err();

    assert!(matches!(err, RecoveryError::CommitConflict { .. }));
    assert!(err.is_retryable());
    assert_eq!(harness.dispatcher.call_count(), 0);
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Unresolved)
    );
    assert_eq!(harness.store.edit_lock(FAILED_MESSAGE_ID), EditLock::Absent);
    assert_eq!(harness.store.open_session_count(), 0);
    assert_eq!(workflow.metrics().snapshot().commit_conflicts, 1);
    assert!(harness.log.contains(RecoveryEvent::EditCommitConflict));

    // Redelivery goes through normally.
    let outcome = workflow.handle_edit_and_send(&command("cmd-1")).await.unwrap();
    let EditOutcome::Dispatched(report) = outcome else {
        panic!("redelivery must dispatch");
    };
    assert!(!report.replay);
    assert_eq!(harness.dispatcher.sent().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_only_one_of_many_racing_commands_dispatches() {
    const COMMANDS: usize = 8;

    let harness = Harness::seeded();
    // Two instances over the same store, as two processes would be.
    let workflows = [Arc::new(harness.workflow()), Arc::new(harness.workflow())];

    let mut tasks = Vec::new();
    for i in 0..COMMANDS {
        let workflow = Arc::clone(&workflows[i % 2]);
        let command = command(&format!("cmd-{}", i));
        tasks.push(tokio::spawn(async move {
            // Redeliver on conflict, as the outer retry policy would.
            loop {
                match workflow.handle_edit_and_send(&command).await {
                    Err(RecoveryError::CommitConflict { .. }) => tokio::task::yield_now().await,
                    other => break (command.command_id.clone(), other),
                }
            }
        }));
    }

    let mut winners = Vec::new();
    let mut losers = 0;
    for task in tasks {
        let (command_id, outcome) = task.await.unwrap();
        match outcome.unwrap() {
            EditOutcome::Dispatched(_) => winners.push(command_id),
            EditOutcome::Discarded(DiscardReason::LockConflict { .. }) => losers += 1,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(losers, COMMANDS - 1);
    assert_eq!(harness.dispatcher.sent().len(), 1);
    assert_eq!(
        harness.store.edit_lock(FAILED_MESSAGE_ID).holder(),
        Some(winners[0].as_str())
    );
    assert_eq!(
        harness.store.status(FAILED_MESSAGE_ID),
        Some(FailedMessageStatus::Resolved)
    );
    assert_eq!(harness.store.open_session_count(), 0);
}

#[tokio::test]
async fn test_different_failures_do_not_contend() {
    let harness = Harness::seeded();
    harness.seed("failure-2", Default::default());
    let workflow = harness.workflow();

    let first = command_for("cmd-1", FAILED_MESSAGE_ID);
    let second = command_for("cmd-2", "failure-2");
    let (a, b) = tokio::join!(
        workflow.handle_edit_and_send(&first),
        workflow.handle_edit_and_send(&second),
    );

    assert!(a.unwrap().is_dispatched());
    assert!(b.unwrap().is_dispatched());
    assert_eq!(harness.dispatcher.sent().len(), 2);
    assert_eq!(harness.store.conflict_count(), 0);
}
