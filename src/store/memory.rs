//! In-memory edit store
//!
//! Keeps each failure as a versioned document (record + edit lock). Sessions
//! hold a shared handle to the documents and commit with a version check,
//! which gives the same conflict behaviour as a conditional write against a
//! shared key-value store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::errors::{StoreError, StoreResult};
use super::lock::EditLock;
use super::record::{FailedMessageRecord, FailedMessageStatus};
use super::session::{CommitFuture, EditSession, EditStore, SessionFuture};

#[derive(Debug, Clone, Default)]
struct Document {
    record: Option<FailedMessageRecord>,
    lock: EditLock,
    version: u64,
}

#[derive(Debug, Default)]
struct Shared {
    documents: Mutex<HashMap<String, Document>>,
    /// Failures whose next commit observes a concurrent writer.
    interfere: Mutex<HashSet<String>>,
    open_sessions: AtomicUsize,
    commits: AtomicU64,
    conflicts: AtomicU64,
}

impl Shared {
    fn documents(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, Document>>> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("edit store lock poisoned".into()))
    }
}

/// In-memory failed-message store
#[derive(Debug, Clone, Default)]
pub struct InMemoryEditStore {
    shared: Arc<Shared>,
}

impl InMemoryEditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, as the ingestion pipeline would.
    pub fn insert_failed_message(&self, record: FailedMessageRecord) -> StoreResult<()> {
        let mut documents = self.shared.documents()?;
        let document = documents.entry(record.id.clone()).or_default();
        document.record = Some(record);
        document.version += 1;
        Ok(())
    }

    /// Remove a record and its lock, as archival purging would.
    pub fn purge(&self, failed_message_id: &str) -> StoreResult<()> {
        self.shared.documents()?.remove(failed_message_id);
        Ok(())
    }

    pub fn failed_message(&self, failed_message_id: &str) -> Option<FailedMessageRecord> {
        self.shared
            .documents()
            .ok()?
            .get(failed_message_id)
            .and_then(|d| d.record.clone())
    }

    pub fn status(&self, failed_message_id: &str) -> Option<FailedMessageStatus> {
        self.failed_message(failed_message_id).map(|r| r.status)
    }

    pub fn edit_lock(&self, failed_message_id: &str) -> EditLock {
        self.shared
            .documents()
            .ok()
            .and_then(|d| d.get(failed_message_id).map(|d| d.lock.clone()))
            .unwrap_or_default()
    }

    pub fn version(&self, failed_message_id: &str) -> u64 {
        self.shared
            .documents()
            .ok()
            .and_then(|d| d.get(failed_message_id).map(|d| d.version))
            .unwrap_or(0)
    }

    /// Make the next commit for `failed_message_id` see a concurrent write.
    #[doc(hidden)]
    pub fn interfere_before_next_commit(&self, failed_message_id: &str) {
        if let Ok(mut interfere) = self.shared.interfere.lock() {
            interfere.insert(failed_message_id.to_string());
        }
    }

    /// Sessions opened and not yet released.
    pub fn open_session_count(&self) -> usize {
        self.shared.open_sessions.load(Ordering::SeqCst)
    }

    /// Commits that applied staged changes.
    pub fn commit_count(&self) -> u64 {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn conflict_count(&self) -> u64 {
        self.shared.conflicts.load(Ordering::SeqCst)
    }
}

impl EditStore for InMemoryEditStore {
    fn open_edit_session<'a>(&'a self, failed_message_id: &'a str) -> SessionFuture<'a> {
        Box::pin(async move {
            let document = self
                .shared
                .documents()?
                .get(failed_message_id)
                .cloned()
                .unwrap_or_default();

            self.shared.open_sessions.fetch_add(1, Ordering::SeqCst);
            let session: Box<dyn EditSession> = Box::new(InMemoryEditSession {
                shared: Arc::clone(&self.shared),
                id: failed_message_id.to_string(),
                record: document.record,
                lock: document.lock,
                version: document.version,
                dirty: false,
            });
            Ok(session)
        })
    }
}

#[derive(Debug)]
struct InMemoryEditSession {
    shared: Arc<Shared>,
    id: String,
    record: Option<FailedMessageRecord>,
    lock: EditLock,
    /// Version read at open; commit requires the store to still be here.
    version: u64,
    dirty: bool,
}

impl InMemoryEditSession {
    fn apply(&self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let interfered = self
            .shared
            .interfere
            .lock()
            .map(|mut set| set.remove(&self.id))
            .unwrap_or(false);

        let mut documents = self.shared.documents()?;
        let Some(document) = documents.get_mut(&self.id) else {
            // Purged since the session was opened.
            self.shared.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::CommitConflict {
                id: self.id.clone(),
                expected: self.version,
                actual: 0,
            });
        };
        if interfered {
            document.version += 1;
        }

        if document.version != self.version {
            self.shared.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::CommitConflict {
                id: self.id.clone(),
                expected: self.version,
                actual: document.version,
            });
        }

        document.record = self.record.clone();
        document.lock = self.lock.clone();
        document.version += 1;
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl EditSession for InMemoryEditSession {
    fn failed_message_id(&self) -> &str {
        &self.id
    }

    fn get_failed_message(&self) -> Option<&FailedMessageRecord> {
        self.record.as_ref()
    }

    fn get_current_edit_lock(&self) -> &EditLock {
        &self.lock
    }

    fn set_current_edit_lock(&mut self, command_id: &str) {
        self.lock = EditLock::held_by(command_id);
        self.dirty = true;
    }

    fn mark_resolved(&mut self) {
        if let Some(record) = self.record.as_mut() {
            if record.status == FailedMessageStatus::Unresolved {
                record.status = FailedMessageStatus::Resolved;
                self.dirty = true;
            }
        }
    }

    fn has_staged_changes(&self) -> bool {
        self.dirty
    }

    fn commit(self: Box<Self>) -> CommitFuture {
        Box::pin(async move { self.apply() })
    }
}

impl Drop for InMemoryEditSession {
    fn drop(&mut self) {
        self.shared.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}
