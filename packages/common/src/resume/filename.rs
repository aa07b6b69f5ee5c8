use chrono::{DateTime, Utc};

/// Reasons a declared upload filename is rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    Empty,
    ContainsPathSeparator,
    NullByte,
    /// Starts with '.', which also covers `..`.
    Hidden,
    /// CR, LF and friends would corrupt `Content-Disposition`.
    ControlCharacter,
    TooLong,
}

const MAX_FILENAME_CHARS: usize = 255;

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: names starting with '.' are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::TooLong => "Invalid filename: at most 255 characters are allowed",
        }
    }
}

/// Check a client-declared filename and return it trimmed.
pub fn sanitize_original_name(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }
    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }
    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }
    if trimmed.chars().count() > MAX_FILENAME_CHARS {
        return Err(FilenameError::TooLong);
    }
    Ok(trimmed)
}

/// Stored filename: upload time in unix millis, a dash, the original name.
pub fn stored_filename(upload_date: DateTime<Utc>, original_name: &str) -> String {
    format!("{}-{}", upload_date.timestamp_millis(), original_name)
}
