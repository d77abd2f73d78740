//! Copies: decrypt a completed file and re-encrypt it under a fresh key as
//! an independent record.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use vaultshare_core::config::StorageConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_core::types::id::FileId;
use vaultshare_crypto::{EncryptionKey, encrypt, hash_bytes};
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::{CreateFile, File, FileStatus};
use vaultshare_storage::{paths, with_retry};

use super::download::DownloadService;
use super::naming::copy_name;
use super::version::{Artifact, VersionService};
use crate::context::RequestContext;

/// Creates independently encrypted copies of completed files.
#[derive(Debug, Clone)]
pub struct CopyService {
    /// File repository.
    files: FileRepository,
    /// Source decryption.
    download: DownloadService,
    /// Version snapshots for the new record.
    versions: VersionService,
    /// Blob storage.
    provider: Arc<dyn StorageProvider>,
    /// Retry settings.
    config: StorageConfig,
}

impl CopyService {
    /// Creates a new copy service.
    pub fn new(
        files: FileRepository,
        download: DownloadService,
        versions: VersionService,
        provider: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            files,
            download,
            versions,
            provider,
            config,
        }
    }

    /// Copies a completed file under a new key, IV, and storage path.
    ///
    /// The copy is named `Copy of {name}` and starts its own history at
    /// version 1. Nothing about it depends on the source's key.
    pub async fn copy(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let source = super::load_owned(&self.files, ctx, file_id).await?;
        super::require_status(&source, FileStatus::Completed)?;

        let plaintext = self.download.load_plaintext(&source).await?;
        let hashed = plaintext.clone();
        let checksum = super::blocking("hash", move || hash_bytes(&hashed)).await?;
        let size_bytes = i64::try_from(plaintext.len())
            .map_err(|_| AppError::internal("Copied content size is out of range"))?;

        let key = EncryptionKey::generate();
        let encoded_key = key.to_encoded();
        let encrypted = super::blocking("encrypt", move || encrypt(&plaintext, &key)).await?;
        let iv = encrypted.iv.to_encoded();
        let ciphertext = Bytes::from(encrypted.ciphertext);

        let name = copy_name(&source.name)?;
        let storage_path = paths::blob_path(ctx.user_id, &name, Utc::now());

        with_retry(self.config.io_retries, "write_copy", || {
            self.provider.write(&storage_path, ciphertext.clone())
        })
        .await?;

        let created = match self
            .files
            .create(&CreateFile {
                id: FileId::new(),
                owner_id: ctx.user_id,
                name,
                original_name: source.original_name.clone(),
                mime_type: source.mime_type.clone(),
                size_bytes,
                storage_path: storage_path.clone(),
                encryption_key: encoded_key.clone(),
                iv: iv.clone(),
                status: FileStatus::Processing,
                description: source.description.clone(),
                tags: source.tags.clone(),
                metadata: source.metadata.clone(),
            })
            .await
        {
            Ok(created) => created,
            Err(e) => {
                self.discard_blob(&storage_path).await;
                return Err(e);
            }
        };

        let artifact = Artifact {
            storage_path,
            encryption_key: encoded_key,
            iv,
            checksum_sha256: checksum,
            size_bytes,
        };
        match self.finish(ctx, &created, &source, &artifact).await {
            Ok(copy) => {
                info!(
                    request_id = %ctx.request_id,
                    source_id = %file_id,
                    copy_id = %copy.id,
                    "File copied"
                );
                Ok(copy)
            }
            Err(e) => {
                self.discard_blob(&artifact.storage_path).await;
                if let Err(mark) = self
                    .files
                    .transition_status(created.id, FileStatus::Processing, FileStatus::Failed)
                    .await
                {
                    warn!(file_id = %created.id, error = %mark, "Failed to mark copy FAILED");
                }
                error!(
                    request_id = %ctx.request_id,
                    source_id = %file_id,
                    copy_id = %created.id,
                    error = %e,
                    "Copy failed"
                );
                Err(e)
            }
        }
    }

    /// Copies every listed file the caller owns. Missing and foreign ids
    /// are skipped.
    pub async fn bulk_copy(&self, ctx: &RequestContext, file_ids: &[FileId]) -> AppResult<Vec<File>> {
        let mut copies = Vec::with_capacity(file_ids.len());
        for &file_id in file_ids {
            match self.copy(ctx, file_id).await {
                Ok(copy) => copies.push(copy),
                Err(e) if super::is_skippable(&e) => {
                    debug!(file_id = %file_id, error = %e, "Skipping file in bulk copy");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(copies)
    }

    async fn finish(
        &self,
        ctx: &RequestContext,
        created: &File,
        source: &File,
        artifact: &Artifact,
    ) -> AppResult<File> {
        if !self
            .files
            .record_artifact(
                created.id,
                artifact.size_bytes,
                &artifact.checksum_sha256,
                &artifact.iv,
            )
            .await?
        {
            return Err(AppError::internal(format!(
                "Copy {} left PROCESSING unexpectedly",
                created.id
            )));
        }

        self.versions
            .snapshot(
                created.id,
                artifact,
                ctx.user_id,
                format!("Initial version (copied from {})", source.name),
            )
            .await?;

        if !self.files.mark_completed(created.id, Utc::now()).await? {
            return Err(AppError::internal(format!(
                "Copy {} left PROCESSING unexpectedly",
                created.id
            )));
        }
        self.files
            .find_by_id(created.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {} not found", created.id)))
    }

    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.provider.delete(path).await {
            warn!(path = %path, error = %e, "Failed to remove copied artifact");
        }
    }
}
