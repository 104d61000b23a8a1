use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileListQuery, UpdateFileDto};
use crate::features::files::models::{File, FileStatus, FileType};
use crate::features::users::services::UserService;
use crate::modules::storage::BlobStore;
use crate::shared::validation::file_extension;

/// Service for file upload, listing and lifecycle operations
pub struct FileService {
    pool: PgPool,
    blob_store: Arc<BlobStore>,
    user_service: Arc<UserService>,
    config: StorageConfig,
}

impl FileService {
    pub fn new(
        pool: PgPool,
        blob_store: Arc<BlobStore>,
        user_service: Arc<UserService>,
        config: StorageConfig,
    ) -> Self {
        Self {
            pool,
            blob_store,
            user_service,
            config,
        }
    }

    /// Upload a file: validate, reserve quota, write bytes, insert record.
    ///
    /// Side-effect ordering keeps the store consistent: the quota is
    /// reserved before any write and released again if the blob write or
    /// the record insert fails. A blob without a record is tolerated; a
    /// record pointing at missing bytes is not.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        mime_type: Option<String>,
        owner_id: Uuid,
    ) -> Result<File> {
        let extension = file_extension(original_filename).ok_or_else(|| {
            AppError::Validation(format!(
                "File type not allowed. Allowed types: {}",
                self.config.allowed_extensions.join(", ")
            ))
        })?;

        if !self.config.allowed_extensions.contains(&extension) {
            return Err(AppError::Validation(format!(
                "File type not allowed. Allowed types: {}",
                self.config.allowed_extensions.join(", ")
            )));
        }

        // The allowed-extension set is wider than the declared-type set in
        // principle; anything outside the closed enum is rejected here too.
        let file_type = FileType::from_extension(&extension).ok_or_else(|| {
            AppError::Validation(format!("File type '{}' is not supported", extension))
        })?;

        if data.len() > self.config.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                self.config.max_upload_bytes,
                self.config.max_upload_bytes / 1024 / 1024
            )));
        }

        let file_size = data.len() as i64;

        // Quota check + counter bump in one conditional statement
        self.user_service
            .reserve_storage(owner_id, file_size)
            .await?;

        let storage_name = BlobStore::generate_storage_name(&extension);

        let path = match self.blob_store.store(&storage_name, &data).await {
            Ok(path) => path,
            Err(e) => {
                self.user_service
                    .release_storage(owner_id, file_size)
                    .await
                    .ok();
                return Err(e);
            }
        };

        let inserted = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (storage_name, original_filename, file_path, file_size,
                               file_type, mime_type, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&storage_name)
        .bind(original_filename)
        .bind(path.to_string_lossy().as_ref())
        .bind(file_size)
        .bind(file_type)
        .bind(&mime_type)
        .bind(FileStatus::Uploaded)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await;

        let file = match inserted {
            Ok(file) => file,
            Err(e) => {
                // Roll the counters back; the written blob is orphaned,
                // which the contract tolerates.
                warn!("File record insert failed, releasing quota: {:?}", e);
                self.user_service
                    .release_storage(owner_id, file_size)
                    .await
                    .ok();
                return Err(AppError::Database(e));
            }
        };

        info!(
            "File uploaded: id={}, name={}, type={}, size={}",
            file.id, file.original_filename, file.file_type, file.file_size
        );

        Ok(file)
    }

    /// List the owner's files with pagination and optional status/type filters
    pub async fn list(&self, owner_id: Uuid, query: &FileListQuery) -> Result<(Vec<File>, i64)> {
        let pagination = query.pagination();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM files
            WHERE owner_id = $1
              AND is_deleted = FALSE
              AND ($2::file_status IS NULL OR status = $2)
              AND ($3::file_type IS NULL OR file_type = $3)
            "#,
        )
        .bind(owner_id)
        .bind(query.status)
        .bind(query.file_type)
        .fetch_one(&self.pool)
        .await?;

        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT * FROM files
            WHERE owner_id = $1
              AND is_deleted = FALSE
              AND ($2::file_status IS NULL OR status = $2)
              AND ($3::file_type IS NULL OR file_type = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(owner_id)
        .bind(query.status)
        .bind(query.file_type)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((files, total))
    }

    /// Fetch a record the given user owns. Soft-deleted, foreign and absent
    /// records all answer NotFound.
    pub async fn get_owned(&self, file_id: Uuid, owner_id: Uuid) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            SELECT * FROM files
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(file_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Fetch a record the given user may read: their own, or a public one
    pub async fn get_readable(&self, file_id: Uuid, user_id: Uuid) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            SELECT * FROM files
            WHERE id = $1 AND (owner_id = $2 OR is_public = TRUE) AND is_deleted = FALSE
            "#,
        )
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Record a read access
    pub async fn touch_accessed(&self, file_id: Uuid) -> Result<()> {
        sqlx::query(r#"UPDATE files SET accessed_at = NOW() WHERE id = $1"#)
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update display filename and/or visibility
    pub async fn update(
        &self,
        file_id: Uuid,
        owner_id: Uuid,
        dto: &UpdateFileDto,
    ) -> Result<File> {
        // Ownership check first so misses stay indistinguishable
        let file = self.get_owned(file_id, owner_id).await?;

        let updated = sqlx::query_as::<_, File>(
            r#"
            UPDATE files
            SET original_filename = COALESCE($2, original_filename),
                is_public = COALESCE($3, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(file.id)
        .bind(&dto.filename)
        .bind(dto.is_public)
        .fetch_one(&self.pool)
        .await?;

        debug!("File updated: id={}", updated.id);
        Ok(updated)
    }

    /// Soft delete: flag the row, release the owner's storage by exactly
    /// the file's byte size. Bytes stay on disk.
    pub async fn soft_delete(&self, file_id: Uuid, owner_id: Uuid) -> Result<()> {
        let file = self.get_owned(file_id, owner_id).await?;

        sqlx::query(
            r#"
            UPDATE files
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(file.id)
        .execute(&self.pool)
        .await?;

        self.user_service
            .release_storage(owner_id, file.file_size)
            .await?;

        info!("File soft deleted: id={}, size={}", file.id, file.file_size);
        Ok(())
    }

    /// Fetch a downloadable record and its bytes
    pub async fn download(&self, file_id: Uuid, user_id: Uuid) -> Result<(File, Vec<u8>)> {
        let file = self.get_readable(file_id, user_id).await?;

        let bytes = self.blob_store.read(&file.storage_name).await?;

        self.touch_accessed(file.id).await?;

        Ok((file, bytes))
    }
}
