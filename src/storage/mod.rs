//! Storage module for persisting harvested data
//!
//! Two independent durable sinks:
//! - `TabularSink`: the append-only CSV metadata file
//! - `AttachmentStore`: one directory per period holding downloaded attachments
//!
//! Every failure here is a `StorageError`, which the crawler treats as fatal
//! to the whole run.

mod attachments;
mod schema;
mod tabular;

pub use attachments::AttachmentStore;
pub use schema::{format_record_line, parse_rows, HEADER, HEADER_LINE};
pub use tabular::TabularSink;

use crate::model::MetadataRecord;
use crate::url::attachment_file_name;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Attachment URL has no file name: {0}")]
    MissingFileName(String),

    #[error("Unexpected header in {path}: expected '{expected}', found '{found}'")]
    InvalidHeader {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Both sinks of a harvest run, shared by every period task
pub struct Persister {
    sink: TabularSink,
    attachments: AttachmentStore,
}

impl Persister {
    /// Creates a fresh metadata file (header only) and an attachment store
    ///
    /// # Arguments
    ///
    /// * `metadata_path` - Path of the CSV file; truncated if it exists
    /// * `attachments_dir` - Directory that will hold one folder per period
    pub async fn create(metadata_path: &Path, attachments_dir: &Path) -> StorageResult<Self> {
        let sink = TabularSink::create(metadata_path).await?;
        let attachments = AttachmentStore::new(attachments_dir);
        Ok(Self { sink, attachments })
    }

    /// Writes an attachment under its period directory, named after the URL
    ///
    /// # Returns
    ///
    /// The path of the written file
    pub async fn write_attachment(
        &self,
        period: &str,
        url: &Url,
        bytes: &[u8],
    ) -> StorageResult<PathBuf> {
        let file_name = attachment_file_name(url)
            .ok_or_else(|| StorageError::MissingFileName(url.to_string()))?;
        self.attachments.write(period, &file_name, bytes).await
    }

    /// Appends one metadata row
    pub async fn append_record(&self, record: &MetadataRecord) -> StorageResult<()> {
        self.sink.append(record).await
    }

    /// Path of the metadata file
    pub fn metadata_path(&self) -> &Path {
        self.sink.path()
    }
}
