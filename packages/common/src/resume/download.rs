use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{ResumeError, ResumeStore};
use crate::storage::{FileMetadata, StorageError};

/// Raw file bytes in chunk order.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, StorageError>>;

/// How a streamed file is presented to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Rendered in the browser.
    View,
    /// Saved as an attachment.
    Download,
}

impl StreamMode {
    /// Content type used when the record carries none.
    pub fn fallback_content_type(self) -> &'static str {
        match self {
            Self::View => "application/pdf",
            Self::Download => "application/octet-stream",
        }
    }

    pub fn disposition(self) -> &'static str {
        match self {
            Self::View => "inline",
            Self::Download => "attachment",
        }
    }
}

/// An authorized file whose first chunk has already been read.
pub struct FileStream {
    pub metadata: FileMetadata,
    pub mode: StreamMode,
    pub content_type: String,
    body: ByteStream,
}

impl FileStream {
    /// Name presented to the client.
    pub fn disposition_filename(&self) -> &str {
        &self.metadata.original_name
    }

    /// `Content-Disposition` value for this file's mode and name.
    pub fn content_disposition(&self) -> String {
        disposition_header(self.mode, self.disposition_filename())
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }
}

/// Punctuation allowed unescaped in an RFC 5987 `attr-char`.
const ATTR_PUNCT: &[u8] = b"!#$&+-.^_`|~";

/// `<disposition>; filename="<ascii>"; filename*=UTF-8''<utf8>`.
///
/// The quoted form drops anything a naive client could misparse and falls
/// back to `resume` when nothing printable is left.
fn disposition_header(mode: StreamMode, name: &str) -> String {
    let quoted: String = name
        .chars()
        .filter(|&c| c == ' ' || c.is_ascii_graphic())
        .filter(|c| !matches!(c, '"' | ';' | '\\'))
        .collect();
    let quoted = match quoted.trim() {
        "" => "resume",
        trimmed => trimmed,
    };

    let mut header = format!("{}; filename=\"{quoted}\"; filename*=UTF-8''", mode.disposition());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || ATTR_PUNCT.contains(&byte) {
            header.push(char::from(byte));
        } else {
            header.push_str(&format!("%{byte:02X}"));
        }
    }
    header
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("metadata", &self.metadata)
            .field("mode", &self.mode)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl ResumeStore {
    /// Authorize `requester` and start streaming a file.
    ///
    /// The first chunk is pulled before returning so that a file which cannot
    /// be read at all fails here instead of after the response has started.
    /// Failures past the first chunk end the byte stream with an error.
    #[instrument(skip(self))]
    pub async fn open_stream(
        &self,
        file_id: Uuid,
        requester: &str,
        mode: StreamMode,
    ) -> Result<FileStream, ResumeError> {
        let metadata = self.authorize(file_id, requester).await?;

        let mut chunks = self
            .store
            .read_chunks_ordered(metadata.id)
            .await
            .map_err(ResumeError::StorageRead)?;

        let first = match chunks.try_next().await {
            Ok(first) => first,
            Err(e) => {
                warn!(%file_id, error = %e, "Failed to read first chunk");
                return Err(ResumeError::StorageRead(e));
            }
        };

        debug!(%file_id, chunks = metadata.chunk_count(), "Streaming resume");

        let body = stream::iter(first.map(Ok))
            .chain(chunks)
            .map_ok(|chunk| chunk.data)
            .inspect_err(move |e| warn!(%file_id, error = %e, "Resume stream truncated"))
            .boxed();

        let content_type = metadata
            .content_type
            .clone()
            .unwrap_or_else(|| mode.fallback_content_type().to_string());

        Ok(FileStream {
            metadata,
            mode,
            content_type,
            body,
        })
    }
}
