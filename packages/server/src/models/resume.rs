use common::FileSummary;
use serde::Serialize;

/// Response for a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Resume uploaded successfully")]
    pub message: String,
    pub data: FileSummary,
}

impl From<FileSummary> for UploadResponse {
    fn from(data: FileSummary) -> Self {
        Self {
            success: true,
            message: "Resume uploaded successfully".into(),
            data,
        }
    }
}

/// The caller's resumes, oldest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ResumeListResponse {
    #[schema(example = true)]
    pub success: bool,
    pub data: Vec<FileSummary>,
}

/// Acknowledgement without a payload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Resume deleted successfully.")]
    pub message: String,
}
