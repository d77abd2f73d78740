//! Recovery of uploads abandoned in `PROCESSING`.
//!
//! A process that dies between entering `PROCESSING` and finishing leaves the
//! record there with nothing left to move it on. The next access to such a
//! file fails it and clears what it left behind.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tracing::warn;

use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::{File, FileStatus};
use vaultshare_storage::ChunkStore;

/// Fails files that have been `PROCESSING` for longer than a timeout.
#[derive(Debug, Clone)]
pub struct StaleProcessing {
    /// File repository.
    files: FileRepository,
    /// Staged chunks to purge.
    chunks: ChunkStore,
    /// Blob storage holding any partial artifact.
    provider: Arc<dyn StorageProvider>,
    /// How long `PROCESSING` may last.
    timeout: TimeDelta,
}

impl StaleProcessing {
    /// Creates a new recovery check.
    pub fn new(
        files: FileRepository,
        chunks: ChunkStore,
        provider: Arc<dyn StorageProvider>,
        timeout_secs: u64,
    ) -> Self {
        let timeout = i64::try_from(timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            files,
            chunks,
            provider,
            timeout,
        }
    }

    /// Returns `file` as is unless it is a stale `PROCESSING` record. A stale
    /// record is moved to `FAILED`, its artifact and staged chunks are
    /// removed, and the reloaded record is returned.
    pub async fn check(&self, file: File) -> AppResult<File> {
        if file.status != FileStatus::Processing || Utc::now() - file.updated_at < self.timeout {
            return Ok(file);
        }

        if self
            .files
            .transition_status(file.id, FileStatus::Processing, FileStatus::Failed)
            .await?
        {
            if let Err(e) = self.provider.delete(&file.storage_path).await {
                warn!(file_id = %file.id, error = %e, "Failed to remove abandoned artifact");
            }
            if let Err(e) = self.chunks.purge(file.id).await {
                warn!(file_id = %file.id, error = %e, "Failed to purge abandoned chunks");
            }
            warn!(
                file_id = %file.id,
                processing_since = %file.updated_at,
                "Abandoned upload marked FAILED"
            );
        }

        self.files
            .find_by_id(file.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {} not found", file.id)).for_file(file.id))
    }
}
