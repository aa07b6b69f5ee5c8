use std::fmt;

/// Errors that can occur during chunk store operations.
#[derive(Debug)]
pub enum StorageError {
    /// The file record (or one of its chunks) does not exist, or is not in
    /// the state the operation requires.
    NotFound(String),
    /// The declared MIME type is outside the resume allow-list.
    InvalidContentType(String),
    /// An I/O error occurred, including a byte source that was cut short.
    Io(std::io::Error),
    /// The backing record store failed.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidContentType(mime) => write!(f, "content type not allowed: {mime}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for StorageError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Backend(err.to_string())
    }
}
