use std::io::Cursor;

use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, instrument, warn};

use super::filename::{sanitize_original_name, stored_filename};
use super::{FileSummary, ResumeError, ResumeStore};
use crate::storage::{Checksum, NewFile, StorageError, normalize_content_type};

impl ResumeStore {
    /// Store an in-memory resume.
    pub async fn upload_bytes(
        &self,
        owner: &str,
        data: &[u8],
        declared_filename: &str,
        declared_content_type: &str,
    ) -> Result<FileSummary, ResumeError> {
        self.upload(
            owner,
            Cursor::new(data),
            declared_filename,
            declared_content_type,
        )
        .await
    }

    /// Validate and store a streamed resume.
    ///
    /// The content type and filename are checked, and the first chunk is read,
    /// before anything is written, so rejected input leaves no record. Once the
    /// pending record exists, any failure leaves it pending and invisible.
    #[instrument(skip(self, source), fields(owner = %owner, filename = %declared_filename))]
    pub async fn upload<R>(
        &self,
        owner: &str,
        mut source: R,
        declared_filename: &str,
        declared_content_type: &str,
    ) -> Result<FileSummary, ResumeError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let content_type = normalize_content_type(declared_content_type)
            .ok_or_else(|| ResumeError::InvalidContentType(declared_content_type.to_string()))?;
        let original_name = sanitize_original_name(declared_filename)
            .map_err(|e| ResumeError::InvalidFilename(e.message()))?
            .to_string();

        let chunk_size = self.chunk_size as usize;
        let mut buf = vec![0u8; chunk_size];
        let mut filled = fill_chunk(&mut source, &mut buf).await?;
        if filled == 0 {
            return Err(ResumeError::NoFileProvided);
        }

        let upload_date = Utc::now();
        let pending = self
            .store
            .begin_upload(NewFile {
                owner: owner.to_string(),
                filename: stored_filename(upload_date, &original_name),
                original_name,
                content_type: content_type.to_string(),
                chunk_size: self.chunk_size,
                upload_date,
            })
            .await
            .map_err(|e| match e {
                StorageError::InvalidContentType(mime) => ResumeError::InvalidContentType(mime),
                other => ResumeError::StorageWrite(other),
            })?;

        let mut checksum = Checksum::new();
        let mut total: u64 = 0;
        let mut n: u32 = 0;

        while filled > 0 {
            total += filled as u64;
            if total > self.max_file_size {
                warn!(file_id = %pending.id, limit = self.max_file_size, "Resume exceeds size limit");
                return Err(ResumeError::SizeExceeded {
                    limit: self.max_file_size,
                });
            }

            checksum.update(&buf[..filled]);
            self.store
                .write_chunk(pending.id, n, buf[..filled].to_vec())
                .await
                .map_err(ResumeError::StorageWrite)?;
            n += 1;

            // A short chunk means the source is exhausted.
            if filled < chunk_size {
                break;
            }
            filled = fill_chunk(&mut source, &mut buf).await?;
        }

        let metadata = self
            .store
            .complete_upload(pending.id, total, &checksum.finish())
            .await
            .map_err(ResumeError::StorageWrite)?;

        info!(file_id = %metadata.id, length = total, chunks = n, "Resume uploaded");
        Ok(FileSummary::from(&metadata))
    }
}

/// Read until `buf` is full or the source ends; returns the bytes read.
async fn fill_chunk<R>(source: &mut R, buf: &mut [u8]) -> Result<usize, ResumeError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut filled = 0;
    while filled < buf.len() {
        let read = source
            .read(&mut buf[filled..])
            .await
            .map_err(|e| ResumeError::StorageWrite(e.into()))?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}
