//! File versioning: immutable snapshots of encrypted artifacts.

use tracing::info;

use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::{FileId, UserId};
use vaultshare_database::repositories::{FileRepository, VersionRepository};
use vaultshare_entity::file::{CreateVersion, File, FileStatus, FileVersion};

use crate::context::RequestContext;

/// A self-contained encrypted artifact a version points at.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Storage key of the ciphertext.
    pub storage_path: String,
    /// Base64 base key.
    pub encryption_key: String,
    /// Base64 IV.
    pub iv: String,
    /// SHA-256 of the plaintext.
    pub checksum_sha256: String,
    /// Plaintext size.
    pub size_bytes: i64,
}

impl Artifact {
    /// The artifact a completed file currently references.
    pub fn current(file: &File) -> AppResult<Self> {
        let checksum = file.checksum_sha256.clone().ok_or_else(|| {
            AppError::invalid_state(file.id, FileStatus::Completed.as_str(), file.status.as_str())
        })?;
        Ok(Self {
            storage_path: file.storage_path.clone(),
            encryption_key: file.encryption_key.clone(),
            iv: file.iv.clone(),
            checksum_sha256: checksum,
            size_bytes: file.size_bytes,
        })
    }
}

/// Manages file version history.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// File repository.
    files: FileRepository,
    /// Version repository.
    versions: VersionRepository,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(files: FileRepository, versions: VersionRepository) -> Self {
        Self { files, versions }
    }

    /// Record `artifact` as the next version of `file_id`.
    ///
    /// References the artifact rather than re-encrypting it.
    pub async fn snapshot(
        &self,
        file_id: FileId,
        artifact: &Artifact,
        created_by: UserId,
        comment: impl Into<String>,
    ) -> AppResult<FileVersion> {
        let version = self
            .versions
            .create(&CreateVersion {
                file_id,
                storage_path: artifact.storage_path.clone(),
                encryption_key: artifact.encryption_key.clone(),
                iv: artifact.iv.clone(),
                checksum_sha256: artifact.checksum_sha256.clone(),
                size_bytes: artifact.size_bytes,
                created_by,
                comment: comment.into(),
                metadata: serde_json::json!({}),
            })
            .await?;

        info!(
            file_id = %file_id,
            version = version.version_number,
            created_by = %created_by,
            "Version snapshot recorded"
        );
        Ok(version)
    }

    /// Lists all versions of a file, oldest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
    ) -> AppResult<Vec<FileVersion>> {
        super::load_owned(&self.files, ctx, file_id).await?;
        self.versions.find_by_file(file_id).await
    }

    /// Gets one version by number.
    pub async fn get_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_number: i32,
    ) -> AppResult<FileVersion> {
        super::load_owned(&self.files, ctx, file_id).await?;
        self.versions
            .find_by_number(file_id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {version_number} of file {file_id} not found"
                ))
                .for_file(file_id)
            })
    }

    /// Snapshots the current artifact of a completed file.
    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        comment: &str,
    ) -> AppResult<FileVersion> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        super::require_status(&file, FileStatus::Completed)?;
        let artifact = Artifact::current(&file)?;
        info!(
            request_id = %ctx.request_id,
            file_id = %file_id,
            "Creating explicit version"
        );
        self.snapshot(file_id, &artifact, ctx.user_id, comment).await
    }
}
