//! Chunk repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::FileId;
use vaultshare_entity::file::chunk::{CreateChunk, FileChunk};

use crate::is_unique_violation;

/// Result of a conditional chunk insert.
#[derive(Debug, Clone)]
pub enum ChunkInsert {
    /// The chunk was recorded.
    Inserted(FileChunk),
    /// The parent file is missing or no longer `UPLOADING`.
    NotUploading,
    /// A chunk with the same number already exists.
    Duplicate,
}

/// Repository for staged upload chunks.
#[derive(Debug, Clone)]
pub struct ChunkRepository {
    pool: SqlitePool,
}

impl ChunkRepository {
    /// Create a new chunk repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a chunk, atomically checking that the parent file is still
    /// `UPLOADING` and that the chunk number is unused.
    pub async fn insert_if_uploading(&self, data: &CreateChunk) -> AppResult<ChunkInsert> {
        let result = sqlx::query_as::<_, FileChunk>(
            "INSERT INTO file_chunks (id, file_id, chunk_number, size_bytes, checksum_sha256, \
             uploaded, storage_path, created_at) \
             SELECT ?, ?, ?, ?, ?, 1, ?, ? \
             WHERE EXISTS (SELECT 1 FROM files WHERE id = ? AND status = 'UPLOADING') \
             RETURNING *",
        )
        .bind(data.id)
        .bind(data.file_id)
        .bind(data.chunk_number)
        .bind(data.size_bytes)
        .bind(&data.checksum_sha256)
        .bind(&data.storage_path)
        .bind(Utc::now())
        .bind(data.file_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(chunk)) => Ok(ChunkInsert::Inserted(chunk)),
            Ok(None) => Ok(ChunkInsert::NotUploading),
            Err(err) if is_unique_violation(&err) => Ok(ChunkInsert::Duplicate),
            Err(err) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to record chunk",
                err,
            )),
        }
    }

    /// All chunks of a file ordered by chunk number.
    pub async fn find_by_file(&self, file_id: FileId) -> AppResult<Vec<FileChunk>> {
        sqlx::query_as::<_, FileChunk>(
            "SELECT * FROM file_chunks WHERE file_id = ? ORDER BY chunk_number ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list chunks", e))
    }

    /// A single chunk by number.
    pub async fn find(&self, file_id: FileId, chunk_number: i32) -> AppResult<Option<FileChunk>> {
        sqlx::query_as::<_, FileChunk>(
            "SELECT * FROM file_chunks WHERE file_id = ? AND chunk_number = ?",
        )
        .bind(file_id)
        .bind(chunk_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find chunk", e))
    }

    /// Delete every chunk record of a file, returning how many were removed.
    pub async fn delete_by_file(&self, file_id: FileId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM file_chunks WHERE file_id = ?")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge chunks", e))?;
        Ok(result.rows_affected())
    }
}
