use crate::entry::AuditLog;
use crate::error::{AuditError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Durable persistence seam for audit records.
///
/// `append` is the sole suspension point in the logging path. A failing
/// append must surface to the caller: an audit event that never reaches
/// durable storage is a compliance failure, not a performance one.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditLog) -> Result<()>;
}

/// In-memory sink for tests and development.
pub struct MemorySink {
    entries: Mutex<Vec<AuditLog>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything appended so far.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.entries.lock().clone()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn append(&self, entry: &AuditLog) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Append-only JSON-lines sink under the audit storage path.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create the storage directory structure.
    pub async fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AuditError::Persistence(format!(
                    "failed to create audit directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlSink {
    async fn append(&self, entry: &AuditLog) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                AuditError::Persistence(format!("failed to open {}: {e}", self.path.display()))
            })?;

        file.write_all(line.as_bytes()).await.map_err(|e| {
            AuditError::Persistence(format!("failed to append to {}: {e}", self.path.display()))
        })?;
        file.flush().await.map_err(|e| {
            AuditError::Persistence(format!("failed to flush {}: {e}", self.path.display()))
        })?;

        Ok(())
    }
}
