use crate::model::MetadataRecord;
use crate::storage::schema::{format_record_line, HEADER_LINE};
use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only metadata file shared by every document task
///
/// Each record is formatted in memory and written with a single `write_all`
/// while holding the lock, so concurrent appends never interleave and the
/// file always ends at a line boundary between appends.
pub struct TabularSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl TabularSink {
    /// Creates (or truncates) the file and writes the header line
    pub async fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StorageError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let write_err = |source| StorageError::Write {
            path: path.to_path_buf(),
            source,
        };

        tokio::fs::write(path, format!("{}\n", HEADER_LINE))
            .await
            .map_err(write_err)?;

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .await
            .map_err(write_err)?;

        tracing::info!(path = %path.display(), "Initialized metadata file");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Appends one record as a complete line
    pub async fn append(&self, record: &MetadataRecord) -> StorageResult<()> {
        let line = format_record_line(record);

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        file.flush().await.map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(title = %record.title, period = %record.period, "Metadata row written");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
