use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::dtos::UsageResponseDto;
use crate::features::users::models::{CreateUser, User};

/// Service for user accounts and usage counters
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user account
    ///
    /// Unique violations on username/email surface as Conflict.
    pub async fn create(&self, data: CreateUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, storage_quota_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(data.storage_quota_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username or email already registered".to_string())
            }
            _ => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("User registered: id={}, username={}", user.id, user.username);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    /// Reserve storage for an upload: quota check and counter bump in one
    /// conditional statement, so two concurrent uploads cannot both pass
    /// the check and overshoot the ceiling.
    pub async fn reserve_storage(&self, user_id: Uuid, bytes: i64) -> Result<()> {
        let claimed = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE users
            SET storage_used_bytes = storage_used_bytes + $2,
                file_count = file_count + 1,
                updated_at = NOW()
            WHERE id = $1
              AND storage_used_bytes + $2 <= storage_quota_bytes
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(bytes)
        .fetch_optional(&self.pool)
        .await?;

        if claimed.is_none() {
            return Err(AppError::QuotaExceeded(
                "Storage quota exceeded. Please delete some files.".to_string(),
            ));
        }

        Ok(())
    }

    /// Release previously reserved storage (soft delete or upload rollback).
    /// The used counter is clamped at zero.
    pub async fn release_storage(&self, user_id: Uuid, bytes: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET storage_used_bytes = GREATEST(0, storage_used_bytes - $2),
                file_count = GREATEST(0, file_count - 1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(bytes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bump the analysis counter after a completed run
    pub async fn increment_analysis_count(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET analysis_count = analysis_count + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Quota/usage summary for the usage endpoint
    pub async fn usage(&self, user_id: Uuid) -> Result<UsageResponseDto> {
        let user = self.get_by_id(user_id).await?;

        Ok(UsageResponseDto {
            storage_used_bytes: user.storage_used_bytes,
            storage_quota_bytes: user.storage_quota_bytes,
            storage_remaining_bytes: (user.storage_quota_bytes - user.storage_used_bytes).max(0),
            file_count: user.file_count,
            analysis_count: user.analysis_count,
        })
    }
}
