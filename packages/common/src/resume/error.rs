use thiserror::Error;

use crate::storage::StorageError;

/// Failures of the resume upload, view/download, list and delete operations.
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Invalid file type '{0}'. Only PDF and Word documents are allowed.")]
    InvalidContentType(String),

    #[error("{0}")]
    InvalidFilename(&'static str),

    #[error("File exceeds maximum size of {limit} bytes")]
    SizeExceeded { limit: u64 },

    #[error("Failed to store file: {0}")]
    StorageWrite(#[source] StorageError),

    /// Deliberately covers missing, pending and foreign files alike.
    #[error("File not found or unauthorized.")]
    NotFoundOrUnauthorized,

    #[error("Failed to read file: {0}")]
    StorageRead(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification exposed at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    NotFound,
    Server,
}

impl ResumeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFileProvided
            | Self::InvalidContentType(_)
            | Self::InvalidFilename(_)
            | Self::SizeExceeded { .. } => ErrorKind::BadInput,
            Self::NotFoundOrUnauthorized | Self::StorageRead(_) => ErrorKind::NotFound,
            Self::StorageWrite(_) | Self::Storage(_) => ErrorKind::Server,
        }
    }
}
