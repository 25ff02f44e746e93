//! Test harness
//!
//! Wires a workflow to in-memory collaborators and keeps handles on all of
//! them so tests can inspect store state, sent messages and log entries.

use std::sync::Arc;

use aeroretry::headers::names::{ORIGINATING_ENDPOINT, ORIGINATING_MACHINE, REPLY_TO_ADDRESS};
use aeroretry::headers::{HeaderTransform, Headers, ReplyToStrategy};
use aeroretry::observability::{MemoryRecoveryLog, RecoveryLog};
use aeroretry::redirects::{InMemoryRedirectStore, MessageRedirect};
use aeroretry::store::{EditStore, FailedMessageRecord, InMemoryEditStore, ProcessingAttempt};
use aeroretry::transport::RecordingDispatcher;
use aeroretry::workflow::{EditCommand, RecoveryWorkflow};

pub const MACHINE: &str = "recovery-host";
pub const FAILING_ADDRESS: &str = "sales@web-01";
pub const FAILED_MESSAGE_ID: &str = "failure-1";

pub type TestWorkflow<S = InMemoryEditStore> =
    RecoveryWorkflow<S, Arc<InMemoryRedirectStore>, Arc<RecordingDispatcher>>;

pub struct Harness {
    pub store: InMemoryEditStore,
    pub redirects: Arc<InMemoryRedirectStore>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub log: Arc<MemoryRecoveryLog>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: InMemoryEditStore::new(),
            redirects: Arc::new(InMemoryRedirectStore::new()),
            dispatcher: Arc::new(RecordingDispatcher::new()),
            log: Arc::new(MemoryRecoveryLog::new()),
        }
    }

    /// A harness with one unresolved failure seeded.
    pub fn seeded() -> Self {
        let harness = Self::new();
        harness.seed(FAILED_MESSAGE_ID, Headers::new());
        harness
    }

    pub fn seed(&self, failed_message_id: &str, attempt_headers: Headers) {
        self.seed_record(FailedMessageRecord::new(
            failed_message_id,
            ProcessingAttempt::new("original-msg", FAILING_ADDRESS, attempt_headers, "boom"),
        ));
    }

    pub fn seed_record(&self, record: FailedMessageRecord) {
        self.store
            .insert_failed_message(record)
            .expect("seed failed message");
    }

    pub fn redirect(&self, from: &str, to: &str) {
        self.redirects
            .upsert(MessageRedirect::new(from, to).expect("valid redirect"))
            .expect("store redirect");
    }

    pub fn workflow(&self) -> TestWorkflow {
        self.workflow_over(self.store.clone())
    }

    /// A workflow over a different edit store, sharing everything else.
    pub fn workflow_over<S: EditStore>(&self, store: S) -> TestWorkflow<S> {
        RecoveryWorkflow::new(
            store,
            Arc::clone(&self.redirects),
            Arc::clone(&self.dispatcher),
            header_transform(),
            Arc::clone(&self.log) as Arc<dyn RecoveryLog>,
        )
    }
}

pub fn header_transform() -> HeaderTransform {
    HeaderTransform::new(ReplyToStrategy::new(MACHINE, "error.replies"))
}

/// Headers an operator would typically send back: the originals, error
/// context included.
pub fn operator_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("NServiceBus.MessageId".into(), "original-msg".into());
    headers.insert(REPLY_TO_ADDRESS.into(), "orders@web-07".into());
    headers.insert(ORIGINATING_MACHINE.into(), "web-07".into());
    headers.insert(ORIGINATING_ENDPOINT.into(), "orders".into());
    headers.insert("NServiceBus.FailedQ".into(), FAILING_ADDRESS.into());
    headers.insert("NServiceBus.TimeOfFailure".into(), "2026-01-01 10:00:00:000000 Z".into());
    headers.insert("NServiceBus.ExceptionInfo.Message".into(), "boom".into());
    headers.insert("NServiceBus.ExceptionInfo.StackTrace".into(), "at Handle()".into());
    headers.insert("Custom.Tenant".into(), "acme".into());
    headers
}

pub fn command(command_id: &str) -> EditCommand {
    command_for(command_id, FAILED_MESSAGE_ID)
}

pub fn command_for(command_id: &str, failed_message_id: &str) -> EditCommand {
    EditCommand::new(
        command_id,
        failed_message_id,
        operator_headers(),
        br#"{"order_id":42,"amount":"10.00"}"#.to_vec(),
    )
}
