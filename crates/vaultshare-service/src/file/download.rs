//! Read path: fetch an encrypted artifact, decrypt it, verify it, and hand
//! the plaintext to the caller.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use vaultshare_core::config::StorageConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::{ByteStream, StorageProvider};
use vaultshare_core::types::id::FileId;
use vaultshare_crypto::{decrypt_encoded, hash_bytes};
use vaultshare_database::repositories::{FileRepository, VersionRepository};
use vaultshare_entity::file::{File, FileStatus};
use vaultshare_storage::with_retry;

use super::recovery::StaleProcessing;
use super::version::Artifact;
use crate::context::RequestContext;

/// Decrypted content plus what a presentation layer needs to serve it.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// The file read.
    pub file_id: FileId,
    /// Plaintext bytes.
    pub data: Bytes,
    /// MIME type recorded at upload.
    pub mime_type: String,
    /// Name supplied by the uploader.
    pub original_name: String,
    /// Current display name.
    pub name: String,
    /// Version number read, when reading a specific version.
    pub version_number: Option<i32>,
}

impl ReadResult {
    /// Plaintext length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The plaintext as a stream of pieces of at most `chunk_size` bytes.
    pub fn into_stream(self, chunk_size: usize) -> ByteStream {
        let step = chunk_size.max(1);
        let data = self.data;
        let pieces: Vec<std::io::Result<Bytes>> = (0..data.len())
            .step_by(step)
            .map(|start| Ok(data.slice(start..(start + step).min(data.len()))))
            .collect();
        Box::pin(futures::stream::iter(pieces))
    }
}

/// Serves decrypted file and version content.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// File repository.
    files: FileRepository,
    /// Version repository.
    versions: VersionRepository,
    /// Fails uploads abandoned in `PROCESSING`.
    stale: StaleProcessing,
    /// Blob storage.
    provider: Arc<dyn StorageProvider>,
    /// Retry and verification settings.
    config: StorageConfig,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        files: FileRepository,
        versions: VersionRepository,
        stale: StaleProcessing,
        provider: Arc<dyn StorageProvider>,
        config: StorageConfig,
    ) -> Self {
        Self {
            files,
            versions,
            stale,
            provider,
            config,
        }
    }

    /// Reads the current content of a completed file.
    ///
    /// Updates `last_accessed_at` on success.
    pub async fn read(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<ReadResult> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        let file = self.stale.check(file).await?;
        super::require_status(&file, FileStatus::Completed)?;

        let data = self.load_plaintext(&file).await?;
        self.files.touch_last_accessed(file_id, Utc::now()).await?;

        info!(
            request_id = %ctx.request_id,
            user_id = %ctx.user_id,
            file_id = %file_id,
            bytes = data.len(),
            "File read"
        );
        Ok(ReadResult {
            file_id,
            data,
            mime_type: file.mime_type,
            original_name: file.original_name,
            name: file.name,
            version_number: None,
        })
    }

    /// Reads a specific version, decrypted with that version's own key/IV.
    pub async fn read_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_number: i32,
    ) -> AppResult<ReadResult> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        let file = self.stale.check(file).await?;
        super::require_status(&file, FileStatus::Completed)?;

        let version = self
            .versions
            .find_by_number(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {version_number} of file {file_id} not found"
                ))
                .for_file(file_id)
            })?;
        let artifact = Artifact {
            storage_path: version.storage_path,
            encryption_key: version.encryption_key,
            iv: version.iv,
            checksum_sha256: version.checksum_sha256,
            size_bytes: version.size_bytes,
        };

        let data = self.decrypt_artifact(file_id, &artifact).await?;
        self.files.touch_last_accessed(file_id, Utc::now()).await?;

        info!(
            request_id = %ctx.request_id,
            file_id = %file_id,
            version = version_number,
            bytes = data.len(),
            "File version read"
        );
        Ok(ReadResult {
            file_id,
            data,
            mime_type: file.mime_type,
            original_name: file.original_name,
            name: file.name,
            version_number: Some(version_number),
        })
    }

    /// Decrypts the current artifact of `file` without touching access
    /// timestamps.
    pub(crate) async fn load_plaintext(&self, file: &File) -> AppResult<Bytes> {
        let artifact = Artifact::current(file)?;
        self.decrypt_artifact(file.id, &artifact).await
    }

    async fn decrypt_artifact(&self, file_id: FileId, artifact: &Artifact) -> AppResult<Bytes> {
        let ciphertext = with_retry(self.config.io_retries, "read_artifact", || {
            self.provider.read_bytes(&artifact.storage_path)
        })
        .await
        .map_err(|e| e.for_file(file_id))?;

        let key = artifact.encryption_key.clone();
        let iv = artifact.iv.clone();
        let plaintext = super::blocking("decrypt", move || {
            decrypt_encoded(&ciphertext, &key, &iv)
        })
        .await?
        .map_err(|e| {
            warn!(file_id = %file_id, error = %e, "Decryption failed");
            AppError::from(e).for_file(file_id)
        })?;

        let plaintext = Bytes::from(plaintext);
        if self.config.verify_checksum_on_read {
            let hashed = plaintext.clone();
            let checksum = super::blocking("hash", move || hash_bytes(&hashed)).await?;
            if checksum != artifact.checksum_sha256 {
                warn!(
                    file_id = %file_id,
                    expected = %artifact.checksum_sha256,
                    actual = %checksum,
                    "Checksum mismatch after decryption"
                );
                return Err(AppError::decryption(format!(
                    "Content of file {file_id} does not match its checksum"
                ))
                .for_file(file_id));
            }
        }
        Ok(plaintext)
    }
}
