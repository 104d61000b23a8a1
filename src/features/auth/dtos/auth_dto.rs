use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for user registration
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    /// Desired username
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    #[validate(regex(
        path = *crate::shared::validation::USERNAME_REGEX,
        message = "username may only contain letters, digits and underscores"
    ))]
    pub username: String,

    /// Account email address
    #[validate(email(message = "invalid email address"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

/// Request DTO for login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Request DTO for refreshing an access token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Token pair returned by register/login/refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    pub user: AuthUserDto,
}

/// User summary embedded in auth responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response DTO for the /me endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: Uuid,
    pub username: String,
    pub is_superuser: bool,
}
