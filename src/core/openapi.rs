use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::analytics::{dtos as analytics_dtos, handlers as analytics_handlers};
use crate::features::auth;
use crate::features::files::{
    dtos as files_dtos, handlers as files_handlers, models as files_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        // Users
        users_handlers::get_usage,
        // Files
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::get_file_metadata,
        files_handlers::update_file,
        files_handlers::delete_file,
        files_handlers::download_file,
        // Analytics
        analytics_handlers::analyze_file,
        analytics_handlers::get_analysis_results,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Users
            users_dtos::UsageResponseDto,
            ApiResponse<users_dtos::UsageResponseDto>,
            // Files
            files_models::FileStatus,
            files_models::FileType,
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            files_dtos::FileDetailResponseDto,
            files_dtos::FileListResponseDto,
            files_dtos::UpdateFileDto,
            files_dtos::DeleteFileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<files_dtos::FileDetailResponseDto>,
            ApiResponse<files_dtos::FileListResponseDto>,
            ApiResponse<files_dtos::DeleteFileResponseDto>,
            // Analytics
            analytics_dtos::AnalyzeAcceptedDto,
            analytics_dtos::AnalysisResultsDto,
            ApiResponse<analytics_dtos::AnalyzeAcceptedDto>,
            ApiResponse<analytics_dtos::AnalysisResultsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User quota and usage counters"),
        (name = "files", description = "File upload and management"),
        (name = "analytics", description = "Background tabular file analysis"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "DataLens API",
        version = "0.1.0",
        description = "API documentation for DataLens",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
