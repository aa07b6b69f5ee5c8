//! Resume storage: upload, list, view/download and delete of per-owner files
//! on top of a [`ChunkStore`].
//!
//! Every read and delete is authorized by comparing the requester identity
//! with the owner recorded on the file's metadata. Missing, pending and
//! foreign files are reported identically as
//! [`ResumeError::NotFoundOrUnauthorized`].

mod download;
mod error;
mod filename;
mod upload;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::StorageAppConfig;
use crate::storage::{ChunkStore, FileMetadata, StorageError};

pub use download::{ByteStream, FileStream, StreamMode};
pub use error::{ErrorKind, ResumeError};
pub use filename::{FilenameError, sanitize_original_name, stored_filename};

/// Public description of a stored resume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    /// File ID (UUIDv7).
    #[serde(rename = "_id")]
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: Uuid,
    /// Stored name, `{upload millis}-{original name}`.
    #[schema(example = "1700000000123-jane_doe_cv.pdf")]
    pub filename: String,
    #[schema(example = "jane_doe_cv.pdf")]
    pub original_name: String,
    /// Size in bytes.
    #[schema(example = 48213)]
    pub length: u64,
    #[schema(example = "application/pdf")]
    pub content_type: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl From<&FileMetadata> for FileSummary {
    fn from(meta: &FileMetadata) -> Self {
        Self {
            id: meta.id,
            filename: meta.filename.clone(),
            original_name: meta.original_name.clone(),
            length: meta.length,
            content_type: meta.content_type.clone(),
            upload_date: meta.upload_date,
        }
    }
}

/// Handle to resume storage, built once at startup and shared by reference.
#[derive(Clone)]
pub struct ResumeStore {
    store: Arc<dyn ChunkStore>,
    chunk_size: u32,
    max_file_size: u64,
}

impl ResumeStore {
    pub fn new(store: Arc<dyn ChunkStore>, config: &StorageAppConfig) -> Self {
        Self {
            store,
            chunk_size: config.chunk_size.max(1),
            max_file_size: config.max_file_size,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Complete resumes of `owner`, oldest first.
    pub async fn list(&self, owner: &str) -> Result<Vec<FileSummary>, ResumeError> {
        let files = self.store.list_files(owner).await?;
        Ok(files.iter().map(FileSummary::from).collect())
    }

    /// Delete a resume owned by `requester`.
    pub async fn delete(&self, file_id: Uuid, requester: &str) -> Result<(), ResumeError> {
        let metadata = self.authorize(file_id, requester).await?;

        match self.store.delete_file(metadata.id).await {
            Ok(()) => {}
            // A concurrent delete got there first.
            Err(StorageError::NotFound(_)) => return Err(ResumeError::NotFoundOrUnauthorized),
            Err(e) => return Err(ResumeError::Storage(e)),
        }

        info!(%file_id, owner = %requester, "Resume deleted");
        Ok(())
    }

    /// Resolve a complete file owned by `requester`.
    async fn authorize(&self, file_id: Uuid, requester: &str) -> Result<FileMetadata, ResumeError> {
        self.store
            .find_file(file_id)
            .await?
            .filter(|meta| meta.is_owned_by(requester))
            .ok_or(ResumeError::NotFoundOrUnauthorized)
    }
}
