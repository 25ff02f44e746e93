//! Recovery metrics
//!
//! Counters only, monotonic, reset on process start. Relaxed ordering: the
//! counters are reported, never used to make decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct RecoveryMetrics {
    edits_received: AtomicU64,
    edits_dispatched: AtomicU64,
    discarded_not_found: AtomicU64,
    discarded_invalid_state: AtomicU64,
    discarded_lock_conflict: AtomicU64,
    replays: AtomicU64,
    commit_conflicts: AtomicU64,
    transport_failures: AtomicU64,
    cancellations: AtomicU64,
    redirects_applied: AtomicU64,
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryMetricsSnapshot {
    pub edits_received: u64,
    pub edits_dispatched: u64,
    pub discarded_not_found: u64,
    pub discarded_invalid_state: u64,
    pub discarded_lock_conflict: u64,
    pub replays: u64,
    pub commit_conflicts: u64,
    pub transport_failures: u64,
    pub cancellations: u64,
    pub redirects_applied: u64,
}

impl RecoveryMetricsSnapshot {
    pub fn discarded(&self) -> u64 {
        self.discarded_not_found + self.discarded_invalid_state + self.discarded_lock_conflict
    }
}

impl RecoveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_received(&self) {
        self.edits_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dispatched(&self) {
        self.edits_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_discarded_not_found(&self) {
        self.discarded_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_discarded_invalid_state(&self) {
        self.discarded_invalid_state.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_discarded_lock_conflict(&self) {
        self.discarded_lock_conflict.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_replays(&self) {
        self.replays.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commit_conflicts(&self) {
        self.commit_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transport_failures(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancellations(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_redirects_applied(&self) {
        self.redirects_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RecoveryMetricsSnapshot {
        RecoveryMetricsSnapshot {
            edits_received: self.edits_received.load(Ordering::Relaxed),
            edits_dispatched: self.edits_dispatched.load(Ordering::Relaxed),
            discarded_not_found: self.discarded_not_found.load(Ordering::Relaxed),
            discarded_invalid_state: self.discarded_invalid_state.load(Ordering::Relaxed),
            discarded_lock_conflict: self.discarded_lock_conflict.load(Ordering::Relaxed),
            replays: self.replays.load(Ordering::Relaxed),
            commit_conflicts: self.commit_conflicts.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            redirects_applied: self.redirects_applied.load(Ordering::Relaxed),
        }
    }
}
