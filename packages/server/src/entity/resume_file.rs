use common::storage::{FileMetadata, FileState};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata record of a stored resume.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resume_file")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Uploader email.
    #[sea_orm(indexed)]
    pub owner: String,

    pub filename: String,

    pub original_name: String,

    pub content_type: Option<String>,

    /// Zero while pending.
    pub length: i64,

    pub chunk_size: i32,

    pub checksum: Option<String>,

    #[sea_orm(indexed)]
    pub state: FileState,

    pub upload_date: DateTimeUtc,

    #[sea_orm(has_many)]
    pub chunks: HasMany<super::resume_chunk::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FileMetadata {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner,
            filename: model.filename,
            original_name: model.original_name,
            content_type: model.content_type,
            length: u64::try_from(model.length).unwrap_or_default(),
            chunk_size: u32::try_from(model.chunk_size).unwrap_or_default(),
            checksum: model.checksum,
            state: model.state,
            upload_date: model.upload_date,
        }
    }
}
