use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password;
use crate::features::auth::services::TokenService;
use crate::features::users::models::{CreateUser, User};
use crate::features::users::services::UserService;

/// Service for authentication operations (register, login, refresh)
pub struct AuthService {
    user_service: Arc<UserService>,
    token_service: Arc<TokenService>,
    default_storage_quota_bytes: i64,
}

impl AuthService {
    pub fn new(
        user_service: Arc<UserService>,
        token_service: Arc<TokenService>,
        default_storage_quota_bytes: i64,
    ) -> Self {
        Self {
            user_service,
            token_service,
            default_storage_quota_bytes,
        }
    }

    /// Register a new user
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let password_hash = password::hash_password(&dto.password)?;

        let user = self
            .user_service
            .create(CreateUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                full_name: dto.full_name,
                storage_quota_bytes: self.default_storage_quota_bytes,
            })
            .await?;

        self.to_auth_response(user)
    }

    /// Login with username and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = self
            .user_service
            .find_by_username(&dto.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !password::verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        self.to_auth_response(user)
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh_token(&self, dto: RefreshTokenRequestDto) -> Result<AuthResponseDto> {
        let user_id = self.token_service.verify_refresh_token(&dto.refresh_token)?;

        let user = self.user_service.get_by_id(user_id).await?;
        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        self.to_auth_response(user)
    }

    /// Current user info (for /me)
    pub fn current_user(&self, user: AuthenticatedUser) -> MeResponseDto {
        MeResponseDto {
            id: user.user_id,
            username: user.username,
            is_superuser: user.is_superuser,
        }
    }

    fn to_auth_response(&self, user: User) -> Result<AuthResponseDto> {
        let tokens = self.token_service.issue_tokens(&user)?;

        Ok(AuthResponseDto {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
            user: AuthUserDto {
                id: user.id,
                username: user.username,
                email: user.email,
                full_name: user.full_name,
                created_at: user.created_at,
            },
        })
    }
}
