use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::analytics::dtos::{shape_results, AnalysisResultsDto, AnalyzeAcceptedDto};
use crate::features::analytics::routes::AnalyticsState;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::FileStatus;
use crate::shared::types::ApiResponse;

/// Trigger analysis for an uploaded file
///
/// Claims the record with a conditional status transition and schedules the
/// run in the background; the endpoint returns as soon as the task is
/// scheduled.
#[utoipa::path(
    post,
    path = "/api/analytics/analyze/{file_id}",
    tag = "analytics",
    params(("file_id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "Analysis scheduled", body = ApiResponse<AnalyzeAcceptedDto>),
        (status = 400, description = "File is already being processed"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn analyze_file(
    user: AuthenticatedUser,
    State(state): State<AnalyticsState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalyzeAcceptedDto>>> {
    let claimed = state
        .analysis_service
        .claim_for_processing(file_id, user.user_id)
        .await?;

    state.runner.spawn(claimed);

    Ok(Json(ApiResponse::success(
        Some(AnalyzeAcceptedDto {
            message: "File analysis started".to_string(),
            file_id,
            status: FileStatus::Processing,
        }),
        None,
        None,
    )))
}

/// Get analysis results for a file
#[utoipa::path(
    get,
    path = "/api/analytics/results/{file_id}",
    tag = "analytics",
    params(("file_id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "Status-shaped analysis results", body = ApiResponse<AnalysisResultsDto>),
        (status = 400, description = "File has not been analyzed yet"),
        (status = 404, description = "File not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_analysis_results(
    user: AuthenticatedUser,
    State(state): State<AnalyticsState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalysisResultsDto>>> {
    let file = state
        .file_service
        .get_readable(file_id, user.user_id)
        .await?;

    let dto = shape_results(&file)?;
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}
