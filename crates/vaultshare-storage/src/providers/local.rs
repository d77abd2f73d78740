//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
///
/// Writes land in a hidden sibling temp file which is synced and then
/// renamed over the target, so readers see either the old object or the
/// complete new one.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative key to a path within the root, rejecting keys
    /// that would escape it.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::invalid_request(format!(
                "Invalid storage path: {path}"
            )));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    async fn write_temp(&self, temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }
}

fn not_found_or_storage(e: std::io::Error, action: &str, path: &str) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| not_found_or_storage(e, "open", path))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| not_found_or_storage(e, "read", path))?;
        debug!(path, bytes = data.len(), "Read object");
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        let file_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::invalid_request(format!("Invalid storage path: {path}")))?;
        let temp_path = full_path.with_file_name(format!(".{file_name}.tmp-{}", Uuid::new_v4()));

        if let Err(e) = self.write_temp(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {path}"),
                e,
            ));
        }

        if let Err(e) = fs::rename(&temp_path, &full_path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                warn!(path, error = %cleanup, "Failed to remove temp file");
            }
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to commit object: {path}"),
                e,
            ));
        }

        debug!(path, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {path}"),
                e,
            )),
        }
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_dir_all(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete directory: {path}"),
                e,
            )),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| not_found_or_storage(e, "stat", path))
    }
}
