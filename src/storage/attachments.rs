use crate::storage::{StorageError, StorageResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Per-period attachment directories under a common root
///
/// A period's directory is created on its first write and remembered, so
/// later writes for the same period skip the create call.
pub struct AttachmentStore {
    root: PathBuf,
    created: Mutex<HashSet<String>>,
}

impl AttachmentStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            created: Mutex::new(HashSet::new()),
        }
    }

    /// Directory holding a period's attachments
    pub fn period_dir(&self, period: &str) -> PathBuf {
        self.root.join(period)
    }

    /// Writes bytes to `<root>/<period>/<file_name>`, overwriting any existing file
    ///
    /// # Returns
    ///
    /// The path of the written file
    pub async fn write(&self, period: &str, file_name: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        let dir = self.ensure_period_dir(period).await?;
        let path = dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::info!(period, path = %path.display(), bytes = bytes.len(), "Attachment saved");
        Ok(path)
    }

    async fn ensure_period_dir(&self, period: &str) -> StorageResult<PathBuf> {
        let dir = self.period_dir(period);

        let mut created = self.created.lock().await;
        if !created.contains(period) {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| StorageError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
            created.insert(period.to_string());
            tracing::debug!(period, dir = %dir.display(), "Created period directory");
        }

        Ok(dir)
    }
}
