use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UsageResponseDto;
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// Get the current user's storage usage and counters
#[utoipa::path(
    get,
    path = "/api/users/me/usage",
    responses(
        (status = 200, description = "Usage summary", body = ApiResponse<UsageResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_usage(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UsageResponseDto>>> {
    let usage = service.usage(user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(usage), None, None)))
}
