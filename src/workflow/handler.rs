//! Edit-and-send handler
//!
//! Drives one edit command through the edit session, the header transform,
//! destination resolution and dispatch. The session commit is the only
//! durability boundary: everything before it either commits together or
//! not at all, everything after it is recomputed from committed state when
//! the command is redelivered.

use std::sync::Arc;

use super::command::EditCommand;
use super::destination::{retry_to_override, Destination};
use super::errors::{RecoveryError, RecoveryResult};
use super::state::{DiscardReason, EditState};
use crate::cancel::CancelSignal;
use crate::config::{ConfigResult, RecoveryConfig};
use crate::headers::{HeaderTransform, ReplyToRepair};
use crate::observability::{RecoveryEvent, RecoveryLog, RecoveryMetrics};
use crate::redirects::RedirectStore;
use crate::store::{EditSession, EditStore, LockClaim, ProcessingAttempt};
use crate::transport::{Dispatcher, OutgoingMessage};

/// What happened to an edit command that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Dispatched(DispatchReport),
    Discarded(DiscardReason),
}

impl EditOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, EditOutcome::Dispatched(_))
    }

    pub fn discard_reason(&self) -> Option<&DiscardReason> {
        match self {
            EditOutcome::Discarded(reason) => Some(reason),
            EditOutcome::Dispatched(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Id of the new message.
    pub message_id: String,
    pub destination: Destination,
    /// The command already held the edit lock.
    pub replay: bool,
}

/// Handles edit-and-send commands against one set of stores.
///
/// Instances hold no per-failure state; any number of them, in any number
/// of processes, may run against the same store.
pub struct RecoveryWorkflow<S, R, D> {
    store: S,
    redirects: R,
    dispatcher: D,
    headers: HeaderTransform,
    log: Arc<dyn RecoveryLog>,
    metrics: Arc<RecoveryMetrics>,
}

impl<S, R, D> RecoveryWorkflow<S, R, D>
where
    S: EditStore,
    R: RedirectStore,
    D: Dispatcher,
{
    pub fn new(
        store: S,
        redirects: R,
        dispatcher: D,
        headers: HeaderTransform,
        log: Arc<dyn RecoveryLog>,
    ) -> Self {
        Self {
            store,
            redirects,
            dispatcher,
            headers,
            log,
            metrics: Arc::new(RecoveryMetrics::new()),
        }
    }

    /// Build a workflow whose header repair and logging follow `config`.
    /// Fails if `config` does not validate.
    pub fn from_config(
        config: &RecoveryConfig,
        store: S,
        redirects: R,
        dispatcher: D,
    ) -> ConfigResult<Self> {
        Ok(Self::new(
            store,
            redirects,
            dispatcher,
            config.header_transform()?,
            config.recovery_log(),
        ))
    }

    /// Share a metrics instance across workflows.
    pub fn with_metrics(mut self, metrics: Arc<RecoveryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &RecoveryMetrics {
        &self.metrics
    }

    /// Handle a command that cannot be cancelled.
    pub async fn handle_edit_and_send(&self, command: &EditCommand) -> RecoveryResult<EditOutcome> {
        self.handle_edit_and_send_with_cancel(command, &CancelSignal::never())
            .await
    }

    /// Decode a wire payload and handle it.
    pub async fn handle_wire(
        &self,
        command_id: &str,
        payload_json: &str,
        cancel: &CancelSignal,
    ) -> RecoveryResult<EditOutcome> {
        let command = match EditCommand::from_json(command_id, payload_json) {
            Ok(command) => command,
            Err(e) => {
                self.log.record(
                    RecoveryEvent::EditRejectedInvalid,
                    &[("command_id", command_id), ("error", &e.to_string())],
                );
                return Err(e);
            }
        };
        self.handle_edit_and_send_with_cancel(&command, cancel).await
    }

    pub async fn handle_edit_and_send_with_cancel(
        &self,
        command: &EditCommand,
        cancel: &CancelSignal,
    ) -> RecoveryResult<EditOutcome> {
        let ids = [
            ("command_id", command.command_id.as_str()),
            ("failed_message_id", command.failed_message_id.as_str()),
        ];
        self.metrics.increment_received();
        self.log.record(RecoveryEvent::EditReceived, &ids);

        let state = EditState::Received;
        self.check_cancelled(cancel, &ids, false)?;

        let mut session = match self.store.open_edit_session(&command.failed_message_id).await {
            Ok(session) => session,
            Err(e) => {
                self.log.record(
                    RecoveryEvent::SessionOpenFailed,
                    &[ids[0], ids[1], ("error", &e.to_string())],
                );
                return Err(RecoveryError::Store(e));
            }
        };
        let state = state.begin_validation()?;

        let (state, attempt) = match self.validate(session.as_mut(), command, &ids)? {
            Validated::Proceed { replay, attempt } => (state.acquire_lock(replay)?, attempt),
            Validated::Discard(reason) => {
                // Dropping the session releases it without applying anything.
                drop(session);
                return self.discard(state, reason, &ids);
            }
        };

        session.mark_resolved();
        self.check_cancelled(cancel, &ids, false)?;

        let committed = session.commit().await;
        if let Err(e) = committed {
            if e.is_conflict() {
                self.metrics.increment_commit_conflicts();
                self.log.record(
                    RecoveryEvent::EditCommitConflict,
                    &[ids[0], ids[1], ("error", &e.to_string())],
                );
                return Err(RecoveryError::CommitConflict {
                    failed_message_id: command.failed_message_id.clone(),
                    source: e,
                });
            }
            return Err(RecoveryError::Store(e));
        }
        let state = state.commit()?;
        self.log.record(
            RecoveryEvent::EditCommitted,
            &[ids[0], ids[1], ("replay", bool_str(state.is_replay()))],
        );

        let (message, destination) = self.build_message(command, &attempt, &ids).await?;
        self.check_cancelled(cancel, &ids, true)?;

        let message_id = message.id.clone();
        let sent = self.dispatcher.dispatch(&destination.address, message).await;
        if let Err(e) = sent {
            self.metrics.increment_transport_failures();
            self.log.record(
                RecoveryEvent::EditDispatchFailed,
                &[
                    ids[0],
                    ids[1],
                    ("destination", &destination.address),
                    ("error", &e.to_string()),
                ],
            );
            return Err(RecoveryError::Transport {
                failed_message_id: command.failed_message_id.clone(),
                destination: destination.address,
                source: e,
            });
        }
        let state = state.dispatch()?;

        self.metrics.increment_dispatched();
        self.log.record(
            RecoveryEvent::EditDispatched,
            &[
                ids[0],
                ids[1],
                ("message_id", &message_id),
                ("destination", &destination.address),
                ("replay", bool_str(state.is_replay())),
            ],
        );

        Ok(EditOutcome::Dispatched(DispatchReport {
            message_id,
            destination,
            replay: state.is_replay(),
        }))
    }

    /// Read the record and lock, and stage the lock when this command may proceed.
    fn validate(
        &self,
        session: &mut dyn EditSession,
        command: &EditCommand,
        ids: &[(&str, &str)],
    ) -> RecoveryResult<Validated> {
        let Some(record) = session.get_failed_message() else {
            return Ok(Validated::Discard(DiscardReason::NotFound));
        };
        let status = record.status;
        let editable = record.is_editable();
        let Some(attempt) = record.last_attempt().cloned() else {
            return Ok(Validated::Discard(DiscardReason::NoProcessingAttempts));
        };

        let replay = match session.get_current_edit_lock().claim(&command.command_id) {
            LockClaim::Acquire => {
                if !editable {
                    return Ok(Validated::Discard(DiscardReason::InvalidState { status }));
                }
                session.set_current_edit_lock(&command.command_id);
                self.log.record(RecoveryEvent::EditLockAcquired, ids);
                false
            }
            LockClaim::Replay => {
                self.metrics.increment_replays();
                self.log.record(RecoveryEvent::EditReplayDetected, ids);
                true
            }
            LockClaim::Conflict { holder } => {
                return Ok(Validated::Discard(DiscardReason::LockConflict { holder }));
            }
        };

        Ok(Validated::Proceed { replay, attempt })
    }

    /// Build the outgoing message and its destination from committed state.
    async fn build_message(
        &self,
        command: &EditCommand,
        attempt: &ProcessingAttempt,
        ids: &[(&str, &str); 2],
    ) -> RecoveryResult<(OutgoingMessage, Destination)> {
        let redirects = match self.redirects.get_or_create().await {
            Ok(table) => table,
            Err(e) => {
                self.log.record(
                    RecoveryEvent::RedirectLoadFailed,
                    &[ids[0], ids[1], ("error", &e.to_string())],
                );
                return Err(RecoveryError::Redirects(e));
            }
        };

        let message_id = OutgoingMessage::generate_id();
        let transformed = self
            .headers
            .apply(&command.new_headers, &message_id, &command.failed_message_id);
        let mut headers = transformed.headers;

        match &transformed.reply_to {
            ReplyToRepair::Unchanged => {}
            ReplyToRepair::Replaced { repaired, .. } | ReplyToRepair::Requalified { repaired, .. } => {
                self.log.record(
                    RecoveryEvent::ReplyToRepaired,
                    &[ids[0], ids[1], ("reply_to", repaired)],
                );
            }
        }

        let failing_address = attempt.failure.address_of_failing_endpoint.as_str();
        let retry_to = retry_to_override(&headers, &attempt.headers).map(str::to_string);
        let destination = Destination::resolve(failing_address, &redirects, retry_to.as_deref());

        if destination.redirected {
            self.metrics.increment_redirects_applied();
            self.log.record(
                RecoveryEvent::RedirectApplied,
                &[
                    ids[0],
                    ids[1],
                    ("from", failing_address),
                    ("to", redirects.resolve(failing_address)),
                ],
            );
        }
        if let Some(target) = &destination.target_endpoint {
            self.log.record(
                RecoveryEvent::RetryToOverride,
                &[
                    ids[0],
                    ids[1],
                    ("retry_to", &destination.address),
                    ("target_endpoint", target),
                ],
            );
        }
        destination.stamp(&mut headers);

        Ok((
            OutgoingMessage::new(message_id, headers, command.new_body.clone()),
            destination,
        ))
    }

    fn discard(
        &self,
        state: EditState,
        reason: DiscardReason,
        ids: &[(&str, &str); 2],
    ) -> RecoveryResult<EditOutcome> {
        let state = state.discard(reason.clone())?;

        match &reason {
            DiscardReason::NotFound => {
                self.metrics.increment_discarded_not_found();
                self.log.record(RecoveryEvent::EditDiscardedNotFound, ids);
            }
            DiscardReason::InvalidState { status } => {
                self.metrics.increment_discarded_invalid_state();
                self.log.record(
                    RecoveryEvent::EditDiscardedInvalidState,
                    &[ids[0], ids[1], ("status", status.as_str())],
                );
            }
            DiscardReason::NoProcessingAttempts => {
                self.metrics.increment_discarded_invalid_state();
                self.log.record(
                    RecoveryEvent::EditDiscardedInvalidState,
                    &[ids[0], ids[1], ("reason", reason.as_str())],
                );
            }
            DiscardReason::LockConflict { holder } => {
                self.metrics.increment_discarded_lock_conflict();
                self.log.record(
                    RecoveryEvent::EditDiscardedLockConflict,
                    &[ids[0], ids[1], ("holder", holder)],
                );
            }
        }

        debug_assert!(state.is_terminal());
        Ok(EditOutcome::Discarded(reason))
    }

    fn check_cancelled(
        &self,
        cancel: &CancelSignal,
        ids: &[(&str, &str); 2],
        committed: bool,
    ) -> RecoveryResult<()> {
        if !cancel.is_cancelled() {
            return Ok(());
        }

        self.metrics.increment_cancellations();
        self.log.record(
            RecoveryEvent::EditCancelled,
            &[ids[0], ids[1], ("committed", bool_str(committed))],
        );
        Err(RecoveryError::Cancelled { committed })
    }
}

enum Validated {
    Proceed {
        replay: bool,
        attempt: ProcessingAttempt,
    },
    Discard(DiscardReason),
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
