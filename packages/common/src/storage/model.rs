#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visibility state of a stored file.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// Upload in progress or abandoned. Never visible to readers.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Every chunk is durably written.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "complete"))]
    Complete,
}

/// The record describing a stored file, independent of its content chunks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: Uuid,
    /// Identity (email) of the uploader. The only authorization key.
    pub owner: String,
    /// `{upload millis}-{original name}`.
    pub filename: String,
    pub original_name: String,
    pub content_type: Option<String>,
    /// Total content length. Zero until the upload completes.
    pub length: u64,
    /// Chunk size the content was split with.
    pub chunk_size: u32,
    /// Hex SHA-256 of the content, set on completion.
    pub checksum: Option<String>,
    pub state: FileState,
    pub upload_date: DateTime<Utc>,
}

impl FileMetadata {
    /// Build the pending record for a new upload.
    pub fn pending(id: Uuid, file: NewFile) -> Self {
        Self {
            id,
            owner: file.owner,
            filename: file.filename,
            original_name: file.original_name,
            content_type: Some(file.content_type),
            length: 0,
            chunk_size: file.chunk_size,
            checksum: None,
            state: FileState::Pending,
            upload_date: file.upload_date,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == FileState::Complete
    }

    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner == identity
    }

    /// Number of chunks a complete file of this length is stored in.
    pub fn chunk_count(&self) -> u32 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.length.div_ceil(u64::from(self.chunk_size)) as u32
    }
}

/// Parameters for `ChunkStore::begin_upload`.
#[derive(Clone, Debug)]
pub struct NewFile {
    pub owner: String,
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub chunk_size: u32,
    pub upload_date: DateTime<Utc>,
}

/// One fixed-maximum-size slice of a file's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub file_id: Uuid,
    /// 0-based position within the file.
    pub n: u32,
    pub data: Vec<u8>,
}
