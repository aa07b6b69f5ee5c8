use async_trait::async_trait;
use common::storage::{
    ChunkStore, ChunkStream, FileMetadata, FileState, NewFile, StorageError, ordered_chunks,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{resume_chunk, resume_file};

/// Chunk store persisting metadata and chunks in the application database.
///
/// Each chunk is one `resume_chunk` row keyed by `(file_id, n)`. Reads fetch
/// one row per pull.
#[derive(Clone)]
pub struct DatabaseChunkStore {
    db: DatabaseConnection,
}

impl DatabaseChunkStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_i32(value: u32, what: &str) -> Result<i32, StorageError> {
    i32::try_from(value).map_err(|_| StorageError::Backend(format!("{what} {value} out of range")))
}

#[async_trait]
impl ChunkStore for DatabaseChunkStore {
    async fn create_pending(&self, file: NewFile) -> Result<FileMetadata, StorageError> {
        let metadata = FileMetadata::pending(Uuid::now_v7(), file);

        let model = resume_file::ActiveModel {
            id: Set(metadata.id),
            owner: Set(metadata.owner.clone()),
            filename: Set(metadata.filename.clone()),
            original_name: Set(metadata.original_name.clone()),
            content_type: Set(metadata.content_type.clone()),
            length: Set(0),
            chunk_size: Set(to_i32(metadata.chunk_size, "chunk size")?),
            checksum: Set(None),
            state: Set(FileState::Pending),
            upload_date: Set(metadata.upload_date),
        };
        resume_file::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        Ok(metadata)
    }

    async fn write_chunk(&self, file_id: Uuid, n: u32, data: Vec<u8>) -> Result<(), StorageError> {
        let chunk = resume_chunk::ActiveModel {
            file_id: Set(file_id),
            n: Set(to_i32(n, "chunk number")?),
            data: Set(data),
        };
        resume_chunk::Entity::insert(chunk)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn complete_upload(
        &self,
        file_id: Uuid,
        length: u64,
        checksum: &str,
    ) -> Result<FileMetadata, StorageError> {
        let length = i64::try_from(length)
            .map_err(|_| StorageError::Backend(format!("length {length} out of range")))?;

        let result = resume_file::Entity::update_many()
            .col_expr(resume_file::Column::Length, Expr::value(length))
            .col_expr(resume_file::Column::Checksum, Expr::value(checksum))
            .col_expr(resume_file::Column::State, Expr::value(FileState::Complete))
            .filter(resume_file::Column::Id.eq(file_id))
            .filter(resume_file::Column::State.eq(FileState::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StorageError::NotFound(format!("pending file {file_id}")));
        }

        self.find_file(file_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("file {file_id}")))
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileMetadata>, StorageError> {
        let model = resume_file::Entity::find_by_id(file_id)
            .filter(resume_file::Column::State.eq(FileState::Complete))
            .one(&self.db)
            .await?;
        Ok(model.map(FileMetadata::from))
    }

    async fn list_files(&self, owner: &str) -> Result<Vec<FileMetadata>, StorageError> {
        let models = resume_file::Entity::find()
            .filter(resume_file::Column::Owner.eq(owner))
            .filter(resume_file::Column::State.eq(FileState::Complete))
            .order_by_asc(resume_file::Column::UploadDate)
            .order_by_asc(resume_file::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(FileMetadata::from).collect())
    }

    async fn read_chunks_ordered(&self, file_id: Uuid) -> Result<ChunkStream, StorageError> {
        let metadata = self
            .find_file(file_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("file {file_id}")))?;

        let db = self.db.clone();
        Ok(ordered_chunks(file_id, metadata.chunk_count(), move |n| {
            let db = db.clone();
            async move {
                let row = resume_chunk::Entity::find_by_id((file_id, to_i32(n, "chunk number")?))
                    .one(&db)
                    .await?;
                Ok::<_, StorageError>(row.map(|chunk| chunk.data))
            }
        }))
    }

    async fn delete_file(&self, file_id: Uuid) -> Result<(), StorageError> {
        let txn = self.db.begin().await?;

        if resume_file::Entity::find_by_id(file_id)
            .one(&txn)
            .await?
            .is_none()
        {
            return Err(StorageError::NotFound(format!("file {file_id}")));
        }

        resume_chunk::Entity::delete_many()
            .filter(resume_chunk::Column::FileId.eq(file_id))
            .exec(&txn)
            .await?;
        resume_file::Entity::delete_by_id(file_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
