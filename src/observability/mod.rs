//! Observability for the recovery workflow
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Counters
//!
//! Observability is read-only: it describes what the workflow did and never
//! influences what it does.
//!
//! # Usage
//!
//! ```ignore
//! use aeroretry::observability::{JsonRecoveryLog, RecoveryEvent, RecoveryLog, Severity};
//!
//! let log = JsonRecoveryLog::new(Severity::Info);
//! log.record(RecoveryEvent::EditReceived, &[("command_id", "c1")]);
//! ```

mod events;
mod logger;
mod metrics;
mod sink;

pub use events::RecoveryEvent;
pub use logger::{Logger, Severity};
pub use metrics::{RecoveryMetrics, RecoveryMetricsSnapshot};
pub use sink::{JsonRecoveryLog, LogEntry, MemoryRecoveryLog, NoopRecoveryLog, RecoveryLog};
