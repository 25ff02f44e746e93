//! Recovery log sinks
//!
//! The workflow reports through an injected [`RecoveryLog`] instead of a
//! process-wide logger, so each workflow instance can be observed on its own.

use std::sync::Mutex;

use super::events::RecoveryEvent;
use super::logger::{Logger, Severity};

pub trait RecoveryLog: Send + Sync {
    fn record(&self, event: RecoveryEvent, fields: &[(&str, &str)]);
}

/// Writes JSON lines through [`Logger`], dropping events below `min_severity`.
#[derive(Debug, Clone)]
pub struct JsonRecoveryLog {
    min_severity: Severity,
}

impl JsonRecoveryLog {
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }
}

impl Default for JsonRecoveryLog {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl RecoveryLog for JsonRecoveryLog {
    fn record(&self, event: RecoveryEvent, fields: &[(&str, &str)]) {
        let severity = event.severity();
        if severity >= self.min_severity {
            Logger::log(severity, event.as_str(), fields);
        }
    }
}

/// One captured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub event: RecoveryEvent,
    pub severity: Severity,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Captures entries in memory
#[derive(Debug, Default)]
pub struct MemoryRecoveryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryRecoveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, event: RecoveryEvent) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|entry| entry.event == event).count())
            .unwrap_or(0)
    }

    pub fn contains(&self, event: RecoveryEvent) -> bool {
        self.count(event) > 0
    }
}

impl RecoveryLog for MemoryRecoveryLog {
    fn record(&self, event: RecoveryEvent, fields: &[(&str, &str)]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                event,
                severity: event.severity(),
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecoveryLog;

impl RecoveryLog for NoopRecoveryLog {
    fn record(&self, _event: RecoveryEvent, _fields: &[(&str, &str)]) {}
}
