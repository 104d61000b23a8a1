use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::{File, FileStatus, FileType};
use crate::shared::types::PaginationQuery;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload (CSV, XLSX, XLS, JSON or TXT)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for file operations (no analysis documents)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Original filename as uploaded
    pub original_filename: String,
    pub file_type: FileType,
    /// MIME type reported by the client
    pub mime_type: Option<String>,
    /// Size of the file in bytes
    pub file_size: i64,
    pub status: FileStatus,
    pub row_count: Option<i64>,
    pub column_count: Option<i32>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response DTO for a file including its analysis documents
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileDetailResponseDto {
    #[serde(flatten)]
    pub file: FileResponseDto,
    pub error_message: Option<String>,
    pub analysis_metadata: Option<serde_json::Value>,
    pub analysis_results: Option<serde_json::Value>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub processing_completed_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing files
#[derive(Debug, Deserialize, IntoParams)]
pub struct FileListQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Number of items per page (default: 20, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by processing status
    pub status: Option<FileStatus>,
    /// Filter by declared file type
    pub file_type: Option<FileType>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    crate::shared::constants::DEFAULT_PAGE_SIZE
}

impl FileListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for FileListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: crate::shared::constants::DEFAULT_PAGE_SIZE,
            status: None,
            file_type: None,
        }
    }
}

/// Paginated file listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponseDto {
    pub files: Vec<FileResponseDto>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Request DTO for updating file metadata
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFileDto {
    /// New display filename
    #[validate(length(min = 1, max = 255, message = "filename must be 1-255 characters"))]
    pub filename: Option<String>,
    /// Toggle public visibility
    pub is_public: Option<bool>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    /// Confirmation that the file was deleted
    pub deleted: bool,
}

impl From<&File> for FileResponseDto {
    fn from(file: &File) -> Self {
        Self {
            id: file.id,
            original_filename: file.original_filename.clone(),
            file_type: file.file_type,
            mime_type: file.mime_type.clone(),
            file_size: file.file_size,
            status: file.status,
            row_count: file.row_count,
            column_count: file.column_count,
            is_public: file.is_public,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

impl From<&File> for FileDetailResponseDto {
    fn from(file: &File) -> Self {
        Self {
            file: file.into(),
            error_message: file.error_message.clone(),
            analysis_metadata: file.analysis_metadata.clone(),
            analysis_results: file.analysis_results.clone(),
            processing_started_at: file.processing_started_at,
            processing_completed_at: file.processing_completed_at,
        }
    }
}
