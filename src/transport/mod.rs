//! # Dispatch Transport
//!
//! The send primitive the recovery workflow hands finished messages to.
//! The wire protocol of the real transport lives behind [`Dispatcher`].

pub mod channel;
pub mod dispatcher;
pub mod errors;
pub mod message;

pub use channel::{ChannelDispatcher, EndpointReceiver};
pub use dispatcher::{DispatchFuture, DispatchedMessage, Dispatcher, RecordingDispatcher};
pub use errors::{TransportError, TransportResult};
pub use message::OutgoingMessage;
