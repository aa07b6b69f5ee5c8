/// MIME types accepted for resumes: PDF, legacy Word and OOXML Word.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Map a declared MIME type onto its allowed canonical form.
///
/// Parameters (`; charset=...`), surrounding whitespace and letter case are
/// ignored. Returns `None` for anything outside the allow-list.
pub fn normalize_content_type(declared: &str) -> Option<&'static str> {
    let essence = declared.split(';').next().unwrap_or_default().trim();
    ALLOWED_CONTENT_TYPES
        .iter()
        .copied()
        .find(|allowed| allowed.eq_ignore_ascii_case(essence))
}
