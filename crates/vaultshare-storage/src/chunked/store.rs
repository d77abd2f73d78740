//! Chunk store: durable staging of uploaded chunks keyed by
//! `(file, chunk_number)`.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_core::types::id::{ChunkId, FileId};
use vaultshare_crypto::hash_bytes;
use vaultshare_database::repositories::{ChunkInsert, ChunkRepository, FileRepository};
use vaultshare_entity::file::chunk::{CreateChunk, FileChunk};
use vaultshare_entity::file::status::FileStatus;

use crate::paths;
use crate::retry::with_retry;

/// Stages chunk bytes in blob storage and records them in the database.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    /// Storage provider holding the staged bytes.
    provider: Arc<dyn StorageProvider>,
    /// Chunk records.
    chunks: ChunkRepository,
    /// Parent file records, consulted for error context.
    files: FileRepository,
    /// Key prefix of the staging area.
    prefix: String,
    /// Retries for transient storage failures.
    io_retries: u32,
    /// Exclusive upper bound on chunk numbers.
    max_chunks: u32,
}

impl ChunkStore {
    /// Create a new chunk store.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        chunks: ChunkRepository,
        files: FileRepository,
        prefix: impl Into<String>,
        io_retries: u32,
        max_chunks: u32,
    ) -> Self {
        Self {
            provider,
            chunks,
            files,
            prefix: prefix.into(),
            io_retries,
            max_chunks,
        }
    }

    /// Stage one chunk.
    ///
    /// Chunk numbers run from 0 up to, not including, `max_chunks`.
    /// The checksum is computed here, before the record exists. A reused
    /// chunk number fails with `ChunkConflict` and a parent that is not
    /// `UPLOADING` fails with `InvalidState`; in both cases the staged
    /// bytes are removed and the existing chunk is untouched.
    pub async fn put_chunk(
        &self,
        file_id: FileId,
        chunk_number: i32,
        data: Bytes,
    ) -> AppResult<FileChunk> {
        if chunk_number < 0 || i64::from(chunk_number) >= i64::from(self.max_chunks) {
            return Err(AppError::invalid_request(format!(
                "Chunk number must be in 0..{}, got {chunk_number}",
                self.max_chunks
            ))
            .for_file(file_id));
        }
        if self.chunks.find(file_id, chunk_number).await?.is_some() {
            return Err(AppError::chunk_conflict(file_id, chunk_number));
        }

        let size_bytes = data.len() as i64;
        let hashed = data.clone();
        let checksum = tokio::task::spawn_blocking(move || hash_bytes(&hashed))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Chunk hashing panicked", e))?;

        let chunk_id = ChunkId::new();
        let storage_path = paths::chunk_path(&self.prefix, file_id, chunk_number, chunk_id);
        with_retry(self.io_retries, "stage_chunk", || {
            self.provider.write(&storage_path, data.clone())
        })
        .await?;

        let record = CreateChunk {
            id: chunk_id,
            file_id,
            chunk_number,
            size_bytes,
            checksum_sha256: checksum,
            storage_path: storage_path.clone(),
        };

        let outcome = match self.chunks.insert_if_uploading(&record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.discard(&storage_path).await;
                return Err(e);
            }
        };

        match outcome {
            ChunkInsert::Inserted(chunk) => {
                debug!(
                    file_id = %file_id,
                    chunk = chunk_number,
                    bytes = size_bytes,
                    checksum = %chunk.checksum_sha256,
                    "Chunk staged"
                );
                Ok(chunk)
            }
            ChunkInsert::Duplicate => {
                self.discard(&storage_path).await;
                Err(AppError::chunk_conflict(file_id, chunk_number))
            }
            ChunkInsert::NotUploading => {
                self.discard(&storage_path).await;
                match self.files.find_by_id(file_id).await? {
                    Some(file) => Err(AppError::invalid_state(
                        file_id,
                        FileStatus::Uploading.as_str(),
                        file.status.as_str(),
                    )),
                    None => Err(AppError::not_found(format!("File {file_id} not found"))
                        .for_file(file_id)),
                }
            }
        }
    }

    /// All staged chunks of a file ordered by chunk number.
    pub async fn list_chunks(&self, file_id: FileId) -> AppResult<Vec<FileChunk>> {
        self.chunks.find_by_file(file_id).await
    }

    /// Read a staged chunk back, checking it against the checksum taken
    /// at write time.
    pub async fn read_chunk(&self, chunk: &FileChunk) -> AppResult<Bytes> {
        let data = with_retry(self.io_retries, "read_chunk", || {
            self.provider.read_bytes(&chunk.storage_path)
        })
        .await?;
        if hash_bytes(&data) != chunk.checksum_sha256 {
            return Err(AppError::storage(format!(
                "Chunk {} of file {} changed in staging",
                chunk.chunk_number, chunk.file_id
            ))
            .for_file(chunk.file_id));
        }
        Ok(data)
    }

    /// Delete every chunk record and staged byte of a file.
    pub async fn purge(&self, file_id: FileId) -> AppResult<()> {
        let removed = self.chunks.delete_by_file(file_id).await?;
        self.provider
            .delete_dir(&paths::chunk_dir(&self.prefix, file_id))
            .await?;
        info!(file_id = %file_id, chunks = removed, "Purged staged chunks");
        Ok(())
    }

    async fn discard(&self, storage_path: &str) {
        if let Err(e) = self.provider.delete(storage_path).await {
            warn!(path = storage_path, error = %e, "Failed to discard staged chunk");
        }
    }
}
