//! # Dispatcher
//!
//! Send-only, at-least-once delivery of one message to one physical address.
//! No ordering guarantee across destinations.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::errors::{TransportError, TransportResult};
use super::message::OutgoingMessage;

/// Future returned by [`Dispatcher::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = TransportResult<()>> + Send + 'a>>;

pub trait Dispatcher: Send + Sync {
    /// Deliver `message` to `destination`.
    fn dispatch<'a>(&'a self, destination: &'a str, message: OutgoingMessage)
        -> DispatchFuture<'a>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn dispatch<'a>(
        &'a self,
        destination: &'a str,
        message: OutgoingMessage,
    ) -> DispatchFuture<'a> {
        (**self).dispatch(destination, message)
    }
}

/// A message as it was handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedMessage {
    pub destination: String,
    pub message: OutgoingMessage,
}

/// Dispatcher that records every call. Can be primed to fail.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: AtomicUsize,
    sent: Mutex<Vec<DispatchedMessage>>,
    failures_remaining: AtomicUsize,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` dispatch calls with `TransportError::Unreachable`.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of dispatch calls, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages successfully handed off.
    pub fn sent(&self) -> Vec<DispatchedMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch<'a>(
        &'a self,
        destination: &'a str,
        message: OutgoingMessage,
    ) -> DispatchFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.take_failure() {
                return Err(TransportError::Unreachable(destination.to_string()));
            }

            let mut sent = self
                .sent
                .lock()
                .map_err(|_| TransportError::SendFailed("recording lock poisoned".into()))?;
            sent.push(DispatchedMessage {
                destination: destination.to_string(),
                message,
            });
            Ok(())
        })
    }
}
