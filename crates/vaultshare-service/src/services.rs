//! Service graph wiring.

use std::sync::Arc;

use vaultshare_core::config::AppConfig;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_database::DatabasePool;
use vaultshare_database::repositories::{ChunkRepository, FileRepository, VersionRepository};
use vaultshare_storage::ChunkStore;

use crate::file::{
    CopyService, DownloadService, FileService, StaleProcessing, UploadService, VersionService,
};

/// Every service, built over one pool and one storage provider.
#[derive(Debug, Clone)]
pub struct Services {
    /// Chunked upload pipeline.
    pub upload: UploadService,
    /// Decrypting read path.
    pub download: DownloadService,
    /// Lifecycle and listings.
    pub files: FileService,
    /// Version history.
    pub versions: VersionService,
    /// Re-encrypting copies.
    pub copy: CopyService,
}

impl Services {
    /// Build the service graph.
    pub fn new(db: &DatabasePool, provider: Arc<dyn StorageProvider>, config: &AppConfig) -> Self {
        let pool = db.pool().clone();
        let file_repo = FileRepository::new(pool.clone());
        let chunk_repo = ChunkRepository::new(pool.clone());
        let version_repo = VersionRepository::new(pool);

        let chunk_store = ChunkStore::new(
            Arc::clone(&provider),
            chunk_repo,
            file_repo.clone(),
            config.storage.chunk_dir.clone(),
            config.storage.io_retries,
            config.upload.max_chunks,
        );
        let versions = VersionService::new(file_repo.clone(), version_repo.clone());
        let stale = StaleProcessing::new(
            file_repo.clone(),
            chunk_store.clone(),
            Arc::clone(&provider),
            config.upload.processing_timeout_secs,
        );
        let download = DownloadService::new(
            file_repo.clone(),
            version_repo,
            stale.clone(),
            Arc::clone(&provider),
            config.storage.clone(),
        );
        let upload = UploadService::new(
            file_repo.clone(),
            chunk_store,
            versions.clone(),
            stale,
            Arc::clone(&provider),
            config.upload.clone(),
            config.storage.clone(),
        );
        let copy = CopyService::new(
            file_repo.clone(),
            download.clone(),
            versions.clone(),
            provider,
            config.storage.clone(),
        );

        Self {
            upload,
            download,
            files: FileService::new(file_repo),
            versions,
            copy,
        }
    }
}
