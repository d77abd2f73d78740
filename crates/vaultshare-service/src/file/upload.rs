//! Upload orchestrator: drives a file through
//! `PENDING -> UPLOADING -> PROCESSING -> COMPLETED | FAILED`.
//!
//! Every transition is a compare-and-set on the status column. Assembly,
//! encryption, and blob I/O run between transitions and never under a lock;
//! any failure after entering `PROCESSING` moves the file to `FAILED`,
//! removes the partial artifact, and returns the original error. A file left
//! in `PROCESSING` by a crash is failed on its next access once
//! `processing_timeout_secs` has passed.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use vaultshare_core::config::{StorageConfig, UploadConfig};
use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_core::types::id::FileId;
use vaultshare_crypto::{EncryptionKey, InitVector, encrypt};
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::{CreateFile, File, FileChunk, FileMetadata, FileStatus};
use vaultshare_storage::chunked::chunk_gaps;
use vaultshare_storage::{ChunkAssembler, ChunkStore, paths, with_retry};

use super::naming::sanitize_filename;
use super::recovery::StaleProcessing;
use super::version::{Artifact, VersionService};
use crate::context::RequestContext;

/// Parameters for starting an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeUpload {
    /// File name as supplied by the uploader.
    pub name: String,
    /// MIME type; must be on the allow-list.
    pub mime_type: String,
    /// Declared size in bytes. Advisory only.
    pub size_bytes: u64,
    /// Description, tags, and custom metadata.
    #[serde(default)]
    pub metadata: FileMetadata,
}

/// Drives chunked uploads from initialization to completion.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// File repository.
    files: FileRepository,
    /// Chunk staging.
    chunks: ChunkStore,
    /// Chunk assembly.
    assembler: ChunkAssembler,
    /// Version snapshots.
    versions: VersionService,
    /// Fails uploads abandoned in `PROCESSING`.
    stale: StaleProcessing,
    /// Blob storage for encrypted artifacts.
    provider: Arc<dyn StorageProvider>,
    /// Upload policy.
    upload: UploadConfig,
    /// Storage retry settings.
    storage: StorageConfig,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        files: FileRepository,
        chunks: ChunkStore,
        versions: VersionService,
        stale: StaleProcessing,
        provider: Arc<dyn StorageProvider>,
        upload: UploadConfig,
        storage: StorageConfig,
    ) -> Self {
        Self {
            files,
            assembler: ChunkAssembler::new(chunks.clone()),
            chunks,
            versions,
            stale,
            provider,
            upload,
            storage,
        }
    }

    /// Suggested chunk size for callers splitting a file.
    pub fn chunk_size_hint(&self) -> u64 {
        self.upload.chunk_size_bytes
    }

    /// Creates a file record ready to accept chunks.
    ///
    /// Sanitizes the name, checks the MIME allow-list and size limit, and
    /// generates the per-file key and an initial IV.
    pub async fn initialize(
        &self,
        ctx: &RequestContext,
        req: InitializeUpload,
    ) -> AppResult<File> {
        let name = sanitize_filename(&req.name)?;
        if !self.upload.is_allowed_mime_type(&req.mime_type) {
            return Err(AppError::invalid_file_type(&req.mime_type));
        }
        if req.size_bytes > self.upload.max_upload_size_bytes {
            return Err(AppError::invalid_request(format!(
                "File exceeds maximum upload size of {} bytes",
                self.upload.max_upload_size_bytes
            )));
        }
        let declared = i64::try_from(req.size_bytes)
            .map_err(|_| AppError::invalid_request("Declared size is out of range"))?;

        let file_id = FileId::new();
        let key = EncryptionKey::generate();
        let iv = InitVector::generate();
        let storage_path = paths::blob_path(ctx.user_id, &name, ctx.request_time);

        let created = self
            .files
            .create(&CreateFile {
                id: file_id,
                owner_id: ctx.user_id,
                name,
                original_name: req.name,
                mime_type: req.mime_type,
                size_bytes: declared,
                storage_path,
                encryption_key: key.to_encoded(),
                iv: iv.to_encoded(),
                status: FileStatus::Pending,
                description: req.metadata.description.clone(),
                tags: req.metadata.tags_value(),
                metadata: req.metadata.custom_value(),
            })
            .await?;

        if !self
            .files
            .transition_status(created.id, FileStatus::Pending, FileStatus::Uploading)
            .await?
        {
            return Err(AppError::internal(format!(
                "File {file_id} left PENDING concurrently"
            )));
        }

        info!(
            request_id = %ctx.request_id,
            user_id = %ctx.user_id,
            file_id = %file_id,
            name = %created.name,
            declared_size = declared,
            "Upload initialized"
        );
        self.reload(file_id).await
    }

    /// Stages one chunk of an `UPLOADING` file.
    pub async fn upload_chunk(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        chunk_number: i32,
        data: Bytes,
    ) -> AppResult<FileChunk> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        let file = self.stale.check(file).await?;
        super::require_status(&file, FileStatus::Uploading)?;

        let chunk = self.chunks.put_chunk(file_id, chunk_number, data).await?;
        info!(
            request_id = %ctx.request_id,
            file_id = %file_id,
            chunk = chunk_number,
            bytes = chunk.size_bytes,
            "Chunk uploaded"
        );
        Ok(chunk)
    }

    /// Staged chunks of an owned file, ordered by number.
    pub async fn list_chunks(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
    ) -> AppResult<Vec<FileChunk>> {
        super::load_owned(&self.files, ctx, file_id).await?;
        self.chunks.list_chunks(file_id).await
    }

    /// Assembles, encrypts, and persists an upload, then records version 1.
    ///
    /// A gap in the chunk sequence fails with `MissingChunks` and leaves the
    /// file `UPLOADING`. Of two concurrent calls only one enters
    /// `PROCESSING`; the other fails with `InvalidState`.
    pub async fn complete(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        let file = self.stale.check(file).await?;
        super::require_status(&file, FileStatus::Uploading)?;
        self.require_contiguous(file_id).await?;

        if !self
            .files
            .transition_status(file_id, FileStatus::Uploading, FileStatus::Processing)
            .await?
        {
            let current = self.reload(file_id).await?;
            return Err(AppError::invalid_state(
                file_id,
                FileStatus::Uploading.as_str(),
                current.status.as_str(),
            ));
        }
        info!(request_id = %ctx.request_id, file_id = %file_id, "Upload processing");

        // Chunks may have landed between the check and the transition.
        let chunks = self.chunks.list_chunks(file_id).await?;
        let gaps = chunk_gaps(&chunks);
        if !gaps.is_empty() {
            self.files
                .transition_status(file_id, FileStatus::Processing, FileStatus::Uploading)
                .await?;
            return Err(AppError::missing_chunks(
                file_id,
                gaps.missing,
                gaps.missing_count,
                chunks.len(),
            ));
        }

        match self.process(ctx, &file, &chunks).await {
            Ok(done) => {
                info!(
                    request_id = %ctx.request_id,
                    file_id = %file_id,
                    size = done.size_bytes,
                    checksum = done.checksum_sha256.as_deref().unwrap_or_default(),
                    "Upload completed"
                );
                Ok(done)
            }
            Err(e) => {
                self.fail(ctx, &file, &e).await;
                Err(e)
            }
        }
    }

    async fn require_contiguous(&self, file_id: FileId) -> AppResult<()> {
        let chunks = self.chunks.list_chunks(file_id).await?;
        let gaps = chunk_gaps(&chunks);
        if gaps.is_empty() {
            Ok(())
        } else {
            Err(AppError::missing_chunks(
                file_id,
                gaps.missing,
                gaps.missing_count,
                chunks.len(),
            ))
        }
    }

    async fn process(
        &self,
        ctx: &RequestContext,
        file: &File,
        chunks: &[FileChunk],
    ) -> AppResult<File> {
        let assembled = self.assembler.assemble(file.id, chunks).await?;
        if assembled.size_bytes > self.upload.max_upload_size_bytes {
            return Err(AppError::invalid_request(format!(
                "Assembled size {} exceeds maximum upload size of {} bytes",
                assembled.size_bytes, self.upload.max_upload_size_bytes
            ))
            .for_file(file.id));
        }
        let size_bytes = i64::try_from(assembled.size_bytes)
            .map_err(|_| AppError::invalid_request("Assembled size is out of range"))?;

        let key = EncryptionKey::from_encoded(&file.encryption_key)?;
        let plaintext = assembled.data;
        let encrypted = super::blocking("encrypt", move || encrypt(&plaintext, &key)).await?;
        let ciphertext = Bytes::from(encrypted.ciphertext);

        with_retry(self.storage.io_retries, "write_artifact", || {
            self.provider.write(&file.storage_path, ciphertext.clone())
        })
        .await?;

        let iv = encrypted.iv.to_encoded();
        if !self
            .files
            .record_artifact(file.id, size_bytes, &assembled.checksum_sha256, &iv)
            .await?
        {
            return Err(self.state_changed(file.id).await);
        }

        self.chunks.purge(file.id).await?;

        let artifact = Artifact {
            storage_path: file.storage_path.clone(),
            encryption_key: file.encryption_key.clone(),
            iv,
            checksum_sha256: assembled.checksum_sha256,
            size_bytes,
        };
        self.versions
            .snapshot(file.id, &artifact, ctx.user_id, "")
            .await?;

        if !self.files.mark_completed(file.id, Utc::now()).await? {
            return Err(self.state_changed(file.id).await);
        }
        self.reload(file.id).await
    }

    async fn fail(&self, ctx: &RequestContext, file: &File, cause: &AppError) {
        if let Err(e) = self.provider.delete(&file.storage_path).await {
            warn!(
                file_id = %file.id,
                path = %file.storage_path,
                error = %e,
                "Failed to remove partial artifact"
            );
        }
        match self
            .files
            .transition_status(file.id, FileStatus::Processing, FileStatus::Failed)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(file_id = %file.id, "File left PROCESSING before it could be failed"),
            Err(e) => warn!(file_id = %file.id, error = %e, "Failed to mark file FAILED"),
        }
        error!(
            request_id = %ctx.request_id,
            file_id = %file.id,
            error = %cause,
            "Upload failed"
        );
    }

    async fn state_changed(&self, file_id: FileId) -> AppError {
        match self.files.find_by_id(file_id).await {
            Ok(Some(current)) => AppError::invalid_state(
                file_id,
                FileStatus::Processing.as_str(),
                current.status.as_str(),
            ),
            Ok(None) => AppError::not_found(format!("File {file_id} not found")).for_file(file_id),
            Err(e) => e,
        }
    }

    async fn reload(&self, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")).for_file(file_id))
    }
}
