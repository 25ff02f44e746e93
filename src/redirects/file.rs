//! File-backed redirect store
//!
//! The table is kept as a single JSON document. Writes go through a temp
//! file that is fsynced and renamed over the document, so readers only ever
//! observe a complete table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::errors::{RedirectError, RedirectResult};
use super::store::{RedirectFuture, RedirectStore};
use super::table::{MessageRedirect, RedirectTable};

/// Document file name inside the store directory
const REDIRECTS_FILE_NAME: &str = "message_redirects.json";

#[derive(Debug)]
pub struct FileRedirectStore {
    path: PathBuf,
    temp_path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileRedirectStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(REDIRECTS_FILE_NAME),
            temp_path: dir.join(format!("{}.tmp", REDIRECTS_FILE_NAME)),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn upsert(&self, redirect: MessageRedirect) -> RedirectResult<Option<MessageRedirect>> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table().await?.unwrap_or_default();
        let previous = table.upsert(redirect);
        self.write_atomic(&table).await?;
        Ok(previous)
    }

    pub async fn remove(&self, from_physical_address: &str) -> RedirectResult<Option<MessageRedirect>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut table) = self.read_table().await? else {
            return Ok(None);
        };
        let removed = table.remove(from_physical_address);
        if removed.is_some() {
            self.write_atomic(&table).await?;
        }
        Ok(removed)
    }

    async fn read_table(&self) -> RedirectResult<Option<RedirectTable>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RedirectError::Io(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(RedirectTable::new()));
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RedirectError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn write_atomic(&self, table: &RedirectTable) -> RedirectResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RedirectError::Io(format!("failed to create store directory: {}", e)))?;
        }

        let content = serde_json::to_vec_pretty(table)
            .map_err(|e| RedirectError::Io(format!("failed to serialize redirects: {}", e)))?;

        let mut file = tokio::fs::File::create(&self.temp_path)
            .await
            .map_err(|e| RedirectError::Io(format!("failed to create temp file: {}", e)))?;
        file.write_all(&content)
            .await
            .map_err(|e| RedirectError::Io(format!("failed to write redirects: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| RedirectError::Io(format!("failed to fsync redirects: {}", e)))?;
        drop(file);

        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(|e| RedirectError::Io(format!("failed to replace redirects document: {}", e)))?;

        // The rename is durable only once the directory entry is.
        if let Some(parent) = self.path.parent() {
            let _ = sync_dir(parent).await;
        }

        Ok(())
    }
}

async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

impl RedirectStore for FileRedirectStore {
    fn get_or_create(&self) -> RedirectFuture<'_> {
        Box::pin(async move {
            if let Some(table) = self.read_table().await? {
                return Ok(Arc::new(table));
            }

            let _guard = self.write_lock.lock().await;
            // Another writer may have created the document meanwhile.
            if let Some(table) = self.read_table().await? {
                return Ok(Arc::new(table));
            }
            let table = RedirectTable::new();
            self.write_atomic(&table).await?;
            Ok(Arc::new(table))
        })
    }
}
