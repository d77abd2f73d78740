//! File repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::{FileId, UserId};
use vaultshare_entity::file::model::{CreateFile, File};
use vaultshare_entity::file::status::FileStatus;

/// Repository for file CRUD, lifecycle transitions, and owner queries.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, owner_id, name, original_name, mime_type, size_bytes, \
             storage_path, encryption_key, iv, status, description, tags, metadata, \
             upload_started_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(data.id)
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.original_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.storage_path)
        .bind(&data.encryption_key)
        .bind(&data.iv)
        .bind(data.status)
        .bind(&data.description)
        .bind(&data.tags)
        .bind(&data.metadata)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    /// Move a file from `from` to `to` only if it is currently in `from`.
    ///
    /// Returns `false` when another caller changed the status first. An edge
    /// the lifecycle does not allow is an `Internal` error and touches
    /// nothing.
    pub async fn transition_status(
        &self,
        id: FileId,
        from: FileStatus,
        to: FileStatus,
    ) -> AppResult<bool> {
        if !from.can_transition_to(to) {
            return Err(AppError::internal(format!(
                "Illegal status transition {from} -> {to} for file {id}"
            ))
            .for_file(id));
        }
        let result =
            sqlx::query("UPDATE files SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(to)
                .bind(Utc::now())
                .bind(id)
                .bind(from)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to transition file", e)
                })?;
        Ok(result.rows_affected() == 1)
    }

    /// Store the authoritative size, checksum, and IV of a freshly written
    /// artifact. Only applies while the file is `PROCESSING`.
    pub async fn record_artifact(
        &self,
        id: FileId,
        size_bytes: i64,
        checksum_sha256: &str,
        iv: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET size_bytes = ?, checksum_sha256 = ?, iv = ?, updated_at = ? \
             WHERE id = ? AND status = 'PROCESSING'",
        )
        .bind(size_bytes)
        .bind(checksum_sha256)
        .bind(iv)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record artifact", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Finish processing: `PROCESSING -> COMPLETED` with completion time.
    pub async fn mark_completed(&self, id: FileId, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE files SET status = 'COMPLETED', upload_completed_at = ?, updated_at = ? \
             WHERE id = ? AND status = 'PROCESSING'",
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete file", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Update the last-accessed timestamp.
    pub async fn touch_last_accessed(&self, id: FileId, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE files SET last_accessed_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last access", e)
            })?;
        Ok(())
    }

    /// Rename a file.
    pub async fn rename(&self, id: FileId, name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")).for_file(id))
    }

    /// Move a file to the trash. A file already in the trash keeps its
    /// original `deleted_at`.
    pub async fn soft_delete(&self, id: FileId, at: DateTime<Utc>) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET is_deleted = 1, deleted_at = COALESCE(deleted_at, ?), \
             updated_at = CASE WHEN is_deleted THEN updated_at ELSE ? END \
             WHERE id = ? RETURNING *",
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")).for_file(id))
    }

    /// Take a file out of the trash. Restoring a live file changes nothing.
    pub async fn restore(&self, id: FileId) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET is_deleted = 0, deleted_at = NULL, \
             updated_at = CASE WHEN is_deleted THEN ? ELSE updated_at END \
             WHERE id = ? RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to restore file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")).for_file(id))
    }

    /// The owner's completed, non-deleted files, newest completion first.
    pub async fn list_completed(&self, owner_id: UserId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = ? AND is_deleted = 0 AND status = 'COMPLETED' \
             ORDER BY upload_completed_at DESC, created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    /// Case-insensitive name substring search over non-deleted files. An
    /// empty query matches every one of them.
    pub async fn search(&self, owner_id: UserId, query: &str) -> AppResult<Vec<File>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = ? AND is_deleted = 0 \
             AND LOWER(name) LIKE ? ESCAPE '\\' ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search files", e))
    }

    /// Most recently updated non-deleted files.
    pub async fn recent(&self, owner_id: UserId, limit: u32) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = ? AND is_deleted = 0 \
             ORDER BY updated_at DESC LIMIT ?",
        )
        .bind(owner_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recent files", e))
    }

    /// The owner's trash, most recently deleted first.
    pub async fn list_deleted(&self, owner_id: UserId) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = ? AND is_deleted = 1 ORDER BY deleted_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list trash", e))
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
