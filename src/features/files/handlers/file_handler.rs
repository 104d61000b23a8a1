use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileResponseDto, FileDetailResponseDto, FileListQuery, FileListResponseDto,
    FileResponseDto, UpdateFileDto,
};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// Upload a file for analysis
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = crate::features::files::dtos::UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Invalid extension or file too large"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Storage quota exceeded")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field.content_type().map(|s| s.to_string());
                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                mime_type = ct;
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;

    let file = service
        .upload(file_data, &file_name, mime_type, user.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some((&file).into()), None, None)),
    ))
}

/// List the current user's files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(FileListQuery),
    responses(
        (status = 200, description = "Paginated file listing", body = ApiResponse<FileListResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<FileListResponseDto>>> {
    let (files, total) = service.list(user.user_id, &query).await?;
    let pagination = query.pagination();

    let response = FileListResponseDto {
        files: files.iter().map(FileResponseDto::from).collect(),
        total,
        page: pagination.page,
        page_size: pagination.limit(),
        total_pages: pagination.total_pages(total),
    };

    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get a file with its analysis documents
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileDetailResponseDto>),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileDetailResponseDto>>> {
    let file = service.get_owned(id, user.user_id).await?;
    service.touch_accessed(file.id).await?;

    Ok(Json(ApiResponse::success(Some((&file).into()), None, None)))
}

/// Get file metadata without analysis documents
#[utoipa::path(
    get,
    path = "/api/files/{id}/metadata",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileResponseDto>),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_file_metadata(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.get_owned(id, user.user_id).await?;
    Ok(Json(ApiResponse::success(Some((&file).into()), None, None)))
}

/// Update file metadata (display filename, visibility)
#[utoipa::path(
    patch,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    request_body = UpdateFileDto,
    responses(
        (status = 200, description = "File updated", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFileDto>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let file = service.update(id, user.user_id, &dto).await?;
    Ok(Json(ApiResponse::success(Some((&file).into()), None, None)))
}

/// Soft-delete a file
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    service.soft_delete(id, user.user_id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}

/// Download the raw file bytes
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "Raw file bytes"),
        (status = 404, description = "File or blob not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (file, bytes) = service.download(id, user.user_id).await?;

    let content_type = file
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file.original_filename.replace('"', "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
