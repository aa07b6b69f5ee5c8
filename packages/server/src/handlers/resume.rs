use std::io;

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::resume::FileStream;
use common::storage::StorageError;
use common::{ResumeError, StreamMode};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::resume::{MessageResponse, ResumeListResponse, UploadResponse};
use crate::state::AppState;

/// Multipart field carrying the resume.
const RESUME_FIELD: &str = "resume";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(max_file_size: u64) -> DefaultBodyLimit {
    let limit = usize::try_from(max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(limit)
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Resumes",
    operation_id = "uploadResume",
    summary = "Upload a resume",
    description = "Stores a PDF or Word document from the `resume` multipart field. \
        The file is streamed to storage in chunks and becomes visible only once every \
        chunk is written.",
    request_body(content_type = "multipart/form-data", description = "Resume file in the `resume` field"),
    responses(
        (status = 200, description = "Resume stored", body = UploadResponse),
        (status = 400, description = "No file, disallowed type or bad filename (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(owner = %auth_user.email))]
pub async fn upload_resume(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RESUME_FIELD) {
            continue; // Ignore unknown fields.
        }
        // A part without a filename is a plain form value, or an empty file input.
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_owned)
            .or_else(|| mime_guess::from_path(&filename).first().map(|m| m.to_string()))
            .unwrap_or_default();

        let reader = StreamReader::new(Box::pin(field.map_err(io::Error::other)));
        let summary = state
            .resumes
            .upload(&auth_user.email, reader, &filename, &content_type)
            .await
            .map_err(|e| upload_failure(e, state.resumes.max_file_size()))?;

        return Ok(Json(UploadResponse::from(summary)));
    }

    Err(ResumeError::NoFileProvided.into())
}

/// Surface body-limit and framing errors hidden inside a failed source read.
fn upload_failure(err: ResumeError, max_file_size: u64) -> AppError {
    if let ResumeError::StorageWrite(StorageError::Io(io_err)) = &err
        && let Some(cause) = io_err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
    {
        if cause.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ResumeError::SizeExceeded {
                limit: max_file_size,
            }
            .into();
        }
        return AppError::Validation(format!("Multipart error: {}", cause.body_text()));
    }
    err.into()
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Resumes",
    operation_id = "listResumes",
    summary = "List own resumes",
    responses(
        (status = 200, description = "Resumes of the caller", body = ResumeListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner = %auth_user.email))]
pub async fn list_resumes(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let data = state.resumes.list(&auth_user.email).await?;
    Ok(Json(ResumeListResponse {
        success: true,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/view/{id}",
    tag = "Resumes",
    operation_id = "viewResume",
    summary = "View a resume inline",
    description = "Streams the resume for in-browser display. Supports ETag-based caching \
        via If-None-Match.",
    params(("id" = String, Path, description = "Resume ID (UUID)")),
    responses(
        (status = 200, description = "Resume content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers), fields(owner = %auth_user.email))]
pub async fn view_resume(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    stream_resume(&state, &auth_user, &id, &headers, StreamMode::View).await
}

#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "Resumes",
    operation_id = "downloadResume",
    summary = "Download a resume",
    description = "Streams the resume as an attachment. Supports ETag-based caching via \
        If-None-Match.",
    params(("id" = String, Path, description = "Resume ID (UUID)")),
    responses(
        (status = 200, description = "Resume content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers), fields(owner = %auth_user.email))]
pub async fn download_resume(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    stream_resume(&state, &auth_user, &id, &headers, StreamMode::Download).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Resumes",
    operation_id = "deleteResume",
    summary = "Delete a resume",
    description = "Removes the resume's chunks, then its record.",
    params(("id" = String, Path, description = "Resume ID (UUID)")),
    responses(
        (status = 200, description = "Resume deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found or unauthorized (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner = %auth_user.email))]
pub async fn delete_resume(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let file_id = parse_file_id(&id)?;
    state.resumes.delete(file_id, &auth_user.email).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Resume deleted successfully.".into(),
    }))
}

/// Malformed ids are reported like missing files.
fn parse_file_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| ResumeError::NotFoundOrUnauthorized.into())
}

async fn stream_resume(
    state: &AppState,
    auth_user: &AuthUser,
    id: &str,
    headers: &HeaderMap,
    mode: StreamMode,
) -> Result<Response, AppError> {
    let file_id = parse_file_id(id)?;
    let stream = state
        .resumes
        .open_stream(file_id, &auth_user.email, mode)
        .await?;

    let etag = stream
        .metadata
        .checksum
        .as_deref()
        .map(|checksum| format!("\"{checksum}\""));
    if let Some(etag) = &etag
        && let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    build_stream_response(stream, etag)
}

fn build_stream_response(stream: FileStream, etag: Option<String>) -> Result<Response, AppError> {
    let disposition = stream.content_disposition();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &stream.content_type)
        .header(header::CONTENT_LENGTH, stream.metadata.length.to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, "private, max-age=3600");
    if let Some(etag) = etag {
        builder = builder.header(header::ETAG, etag);
    }

    builder
        .body(Body::from_stream(stream.into_body()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
