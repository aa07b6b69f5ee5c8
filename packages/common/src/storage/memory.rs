use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::error::StorageError;
use super::model::{FileMetadata, FileState, NewFile};
use super::traits::{ChunkStore, ChunkStream, ordered_chunks};

#[derive(Default)]
struct Inner {
    files: DashMap<Uuid, FileMetadata>,
    chunks: DashMap<(Uuid, u32), Vec<u8>>,
}

/// Process-local chunk store.
///
/// Cloning is cheap and clones share contents.
#[derive(Clone, Default)]
pub struct MemoryChunkStore {
    inner: Arc<Inner>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record regardless of its state.
    pub fn raw_file(&self, file_id: Uuid) -> Option<FileMetadata> {
        self.inner.files.get(&file_id).map(|m| m.value().clone())
    }

    /// Sequence numbers currently stored for a file, ascending.
    pub fn stored_chunk_numbers(&self, file_id: Uuid) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .inner
            .chunks
            .iter()
            .filter(|entry| entry.key().0 == file_id)
            .map(|entry| entry.key().1)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    /// Number of records in each state, `(pending, complete)`.
    pub fn record_counts(&self) -> (usize, usize) {
        self.inner
            .files
            .iter()
            .fold((0, 0), |(pending, complete), entry| match entry.state {
                FileState::Pending => (pending + 1, complete),
                FileState::Complete => (pending, complete + 1),
            })
    }

    #[cfg(test)]
    pub(crate) fn pending_ids(&self) -> Vec<Uuid> {
        self.inner
            .files
            .iter()
            .filter(|entry| entry.state == FileState::Pending)
            .map(|entry| *entry.key())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn drop_chunk(&self, file_id: Uuid, n: u32) {
        self.inner.chunks.remove(&(file_id, n));
    }

    #[cfg(test)]
    pub(crate) fn clear_content_type(&self, file_id: Uuid) {
        if let Some(mut meta) = self.inner.files.get_mut(&file_id) {
            meta.content_type = None;
        }
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn create_pending(&self, file: NewFile) -> Result<FileMetadata, StorageError> {
        let metadata = FileMetadata::pending(Uuid::now_v7(), file);
        self.inner.files.insert(metadata.id, metadata.clone());
        Ok(metadata)
    }

    async fn write_chunk(&self, file_id: Uuid, n: u32, data: Vec<u8>) -> Result<(), StorageError> {
        if !self.inner.files.contains_key(&file_id) {
            return Err(StorageError::NotFound(format!("file {file_id}")));
        }
        self.inner.chunks.insert((file_id, n), data);
        Ok(())
    }

    async fn complete_upload(
        &self,
        file_id: Uuid,
        length: u64,
        checksum: &str,
    ) -> Result<FileMetadata, StorageError> {
        let mut entry = self
            .inner
            .files
            .get_mut(&file_id)
            .filter(|m| m.state == FileState::Pending)
            .ok_or_else(|| StorageError::NotFound(format!("pending file {file_id}")))?;

        entry.length = length;
        entry.checksum = Some(checksum.to_string());
        entry.state = FileState::Complete;
        Ok(entry.clone())
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<FileMetadata>, StorageError> {
        Ok(self.raw_file(file_id).filter(FileMetadata::is_complete))
    }

    async fn list_files(&self, owner: &str) -> Result<Vec<FileMetadata>, StorageError> {
        let mut files: Vec<FileMetadata> = self
            .inner
            .files
            .iter()
            .filter(|entry| entry.is_complete() && entry.is_owned_by(owner))
            .map(|entry| entry.value().clone())
            .collect();
        files.sort_by(|a, b| a.upload_date.cmp(&b.upload_date).then(a.id.cmp(&b.id)));
        Ok(files)
    }

    async fn read_chunks_ordered(&self, file_id: Uuid) -> Result<ChunkStream, StorageError> {
        let metadata = self
            .find_file(file_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("file {file_id}")))?;

        let inner = Arc::clone(&self.inner);
        Ok(ordered_chunks(file_id, metadata.chunk_count(), move |n| {
            let data = inner.chunks.get(&(file_id, n)).map(|d| d.value().clone());
            async move { Ok(data) }
        }))
    }

    async fn delete_file(&self, file_id: Uuid) -> Result<(), StorageError> {
        if !self.inner.files.contains_key(&file_id) {
            return Err(StorageError::NotFound(format!("file {file_id}")));
        }
        self.inner.chunks.retain(|(id, _), _| *id != file_id);
        self.inner.files.remove(&file_id);
        Ok(())
    }
}
