use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::analytics::models::Analysis;
use crate::features::files::models::{File, FileStatus};

/// Service for analysis status transitions and result persistence.
///
/// All writes go through single conditional statements so the
/// uploaded/processing/completed/failed state machine holds under
/// concurrent triggers.
pub struct AnalysisService {
    pool: PgPool,
}

impl AnalysisService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim a file for processing.
    ///
    /// One conditional UPDATE performs the status check and the transition,
    /// so of two concurrent triggers exactly one claims the row. Re-analysis
    /// is allowed from any non-processing state; the same statement clears
    /// previous results so a re-run can never expose a stale mix.
    pub async fn claim_for_processing(&self, file_id: Uuid, owner_id: Uuid) -> Result<File> {
        let claimed = sqlx::query_as::<_, File>(
            r#"
            UPDATE files
            SET status = $3,
                processing_started_at = NOW(),
                processing_completed_at = NULL,
                error_message = NULL,
                analysis_metadata = NULL,
                analysis_results = NULL,
                row_count = NULL,
                column_count = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND owner_id = $2
              AND is_deleted = FALSE
              AND status <> $4
            RETURNING *
            "#,
        )
        .bind(file_id)
        .bind(owner_id)
        .bind(FileStatus::Processing)
        .bind(FileStatus::Processing)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(file) = claimed {
            tracing::info!("Analysis claimed: file={}", file.id);
            return Ok(file);
        }

        // No row: either the record is invisible to this user or it is
        // already being processed. Distinguish the two for the caller.
        let existing = sqlx::query_scalar::<_, FileStatus>(
            r#"
            SELECT status FROM files
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(file_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(FileStatus::Processing) => Err(AppError::AlreadyProcessing(
                "File is already being processed".to_string(),
            )),
            _ => Err(AppError::NotFound("File not found".to_string())),
        }
    }

    /// Persist a successful run: analysis documents, derived counts,
    /// completion timestamp and the completed status in one statement.
    pub async fn mark_completed(&self, file_id: Uuid, analysis: &Analysis) -> Result<()> {
        let metadata = serde_json::to_value(&analysis.metadata)
            .map_err(|e| AppError::Internal(format!("Failed to serialize metadata: {}", e)))?;
        let results = serde_json::to_value(&analysis.results)
            .map_err(|e| AppError::Internal(format!("Failed to serialize results: {}", e)))?;

        sqlx::query(
            r#"
            UPDATE files
            SET status = $2,
                analysis_metadata = $3,
                analysis_results = $4,
                row_count = $5,
                column_count = $6,
                processing_completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(FileStatus::Completed)
        .bind(metadata)
        .bind(results)
        .bind(analysis.metadata.row_count as i64)
        .bind(analysis.metadata.column_count as i32)
        .execute(&self.pool)
        .await?;

        tracing::info!("Analysis completed: file={}", file_id);
        Ok(())
    }

    /// Persist a failed run with the engine's message text
    pub async fn mark_failed(&self, file_id: Uuid, error_message: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE files
            SET status = $2,
                error_message = $3,
                processing_completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(FileStatus::Failed)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        tracing::warn!("Analysis failed: file={}, error={}", file_id, error_message);
        Ok(())
    }
}
