use std::future::Future;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use uuid::Uuid;

use super::content_type::normalize_content_type;
use super::error::StorageError;
use super::model::{Chunk, FileMetadata, NewFile};

/// Lazy, ordered sequence of a file's chunks. Dropping it cancels the read.
pub type ChunkStream = BoxStream<'static, Result<Chunk, StorageError>>;

/// Chunked file storage with one metadata record per file.
///
/// Only `Complete` records are visible to `find_file`, `list_files` and
/// `read_chunks_ordered`.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Validate the content type and create a `Pending` record.
    async fn begin_upload(&self, file: NewFile) -> Result<FileMetadata, StorageError> {
        if normalize_content_type(&file.content_type).is_none() {
            return Err(StorageError::InvalidContentType(file.content_type));
        }
        self.create_pending(file).await
    }

    /// Insert a `Pending` record with a freshly minted id.
    async fn create_pending(&self, file: NewFile) -> Result<FileMetadata, StorageError>;

    /// Store chunk `n` of a file. The caller owns ordering.
    async fn write_chunk(&self, file_id: Uuid, n: u32, data: Vec<u8>) -> Result<(), StorageError>;

    /// Publish a pending file.
    ///
    /// Fails with `NotFound` if the record is unknown or already complete.
    async fn complete_upload(
        &self,
        file_id: Uuid,
        length: u64,
        checksum: &str,
    ) -> Result<FileMetadata, StorageError>;

    /// Look up a complete file.
    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileMetadata>, StorageError>;

    /// Complete files of one owner, oldest upload first.
    async fn list_files(&self, owner: &str) -> Result<Vec<FileMetadata>, StorageError>;

    /// Stream a complete file's chunks in ascending order, one fetch per pull.
    async fn read_chunks_ordered(&self, file_id: Uuid) -> Result<ChunkStream, StorageError>;

    /// Remove every chunk of a file, then its record.
    async fn delete_file(&self, file_id: Uuid) -> Result<(), StorageError>;
}

/// Build a `ChunkStream` that fetches chunks `0..count` one at a time.
///
/// A missing chunk yields `NotFound` and ends the stream.
pub fn ordered_chunks<F, Fut>(file_id: Uuid, count: u32, fetch: F) -> ChunkStream
where
    F: Fn(u32) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send + 'static,
{
    stream::try_unfold(0u32, move |n| {
        let next = (n < count).then(|| fetch(n));
        async move {
            let Some(next) = next else {
                return Ok::<_, StorageError>(None);
            };
            match next.await? {
                Some(data) => Ok(Some((Chunk { file_id, n, data }, n + 1))),
                None => Err(StorageError::NotFound(format!("chunk {n} of file {file_id}"))),
            }
        }
    })
    .boxed()
}
