//! File version repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::{FileId, FileVersionId};
use vaultshare_entity::file::version::{CreateVersion, FileVersion};

/// Repository for immutable file versions.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: SqlitePool,
}

impl VersionRepository {
    /// Create a new version repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Allocate the next version number and insert the version in one
    /// transaction. Numbers come from `files.current_version`, so they are
    /// never reused.
    pub async fn create(&self, data: &CreateVersion) -> AppResult<FileVersion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin", e))?;

        let number: i32 = sqlx::query_scalar(
            "UPDATE files SET current_version = current_version + 1 WHERE id = ? \
             RETURNING current_version",
        )
        .bind(data.file_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to allocate version number", e)
        })?
        .ok_or_else(|| {
            AppError::not_found(format!("File {} not found", data.file_id)).for_file(data.file_id)
        })?;

        let version = sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions (id, file_id, version_number, storage_path, \
             encryption_key, iv, checksum_sha256, size_bytes, created_by, created_at, \
             comment, metadata) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(FileVersionId::new())
        .bind(data.file_id)
        .bind(number)
        .bind(&data.storage_path)
        .bind(&data.encryption_key)
        .bind(&data.iv)
        .bind(&data.checksum_sha256)
        .bind(data.size_bytes)
        .bind(data.created_by)
        .bind(Utc::now())
        .bind(&data.comment)
        .bind(&data.metadata)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create version", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(version)
    }

    /// All versions of a file, oldest first.
    pub async fn find_by_file(&self, file_id: FileId) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = ? ORDER BY version_number ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// A version by number.
    pub async fn find_by_number(
        &self,
        file_id: FileId,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = ? AND version_number = ?",
        )
        .bind(file_id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }
}
