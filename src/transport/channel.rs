//! # Channel Dispatcher
//!
//! In-process transport: every bound address owns an unbounded tokio mpsc
//! queue. Used to host endpoints and the recovery workflow in one process.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use super::dispatcher::{DispatchFuture, Dispatcher};
use super::errors::TransportError;
use super::message::OutgoingMessage;

/// Receiving side of a bound address
pub type EndpointReceiver = mpsc::UnboundedReceiver<OutgoingMessage>;

type EndpointSender = mpsc::UnboundedSender<OutgoingMessage>;

#[derive(Debug, Default)]
pub struct ChannelDispatcher {
    endpoints: RwLock<HashMap<String, EndpointSender>>,
}

impl ChannelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening on `address`. Rebinding replaces the previous queue.
    pub fn bind(&self, address: impl Into<String>) -> EndpointReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut endpoints) = self.endpoints.write() {
            endpoints.insert(address.into(), tx);
        }
        rx
    }

    pub fn unbind(&self, address: &str) {
        if let Ok(mut endpoints) = self.endpoints.write() {
            endpoints.remove(address);
        }
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().map(|e| e.len()).unwrap_or(0)
    }

    fn sender(&self, address: &str) -> Option<EndpointSender> {
        self.endpoints.read().ok()?.get(address).cloned()
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch<'a>(
        &'a self,
        destination: &'a str,
        message: OutgoingMessage,
    ) -> DispatchFuture<'a> {
        let result = if destination.trim().is_empty() {
            Err(TransportError::InvalidAddress(destination.to_string()))
        } else {
            match self.sender(destination) {
                Some(sender) => sender
                    .send(message)
                    .map_err(|_| TransportError::Unreachable(destination.to_string())),
                None => Err(TransportError::Unreachable(destination.to_string())),
            }
        };
        Box::pin(async move { result })
    }
}
