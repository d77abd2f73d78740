//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;
use vaultshare_core::traits::storage::{ByteStream, StorageProvider};
use vaultshare_core::types::id::UserId;
use vaultshare_database::DatabasePool;
use vaultshare_database::migration::run_migrations;
use vaultshare_entity::file::{File, FileMetadata};
use vaultshare_service::{InitializeUpload, RequestContext, Services};
use vaultshare_storage::LocalStorageProvider;

/// Test application context
pub struct TestApp {
    /// Full service graph
    pub services: Services,
    /// Database handle for direct checks
    pub db: DatabasePool,
    /// Configuration the services were built with
    pub config: AppConfig,
    /// Storage root; dropped with the app
    pub dir: TempDir,
    /// Other temp dirs that must outlive the app (database files)
    pub extra_dirs: Vec<TempDir>,
}

impl TestApp {
    /// Create a new test application with default settings
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a new test application after adjusting the configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(adjust, |provider| provider).await
    }

    /// Create a test application over a SQLite file with a multi-connection
    /// pool, so concurrent calls really run in parallel
    pub async fn file_backed() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", dir.path().join("meta.db").display());
        let mut app = Self::build(
            |c| {
                c.database.url = url;
                c.database.max_connections = 4;
            },
            |provider| provider,
        )
        .await;
        app.extra_dirs.push(dir);
        app
    }

    /// Create a test application whose storage is wrapped by `wrap`
    pub async fn with_storage(
        wrap: impl FnOnce(Arc<dyn StorageProvider>) -> Arc<dyn StorageProvider>,
    ) -> Self {
        Self::build(|_| {}, wrap).await
    }

    async fn build(
        adjust: impl FnOnce(&mut AppConfig),
        wrap: impl FnOnce(Arc<dyn StorageProvider>) -> Arc<dyn StorageProvider>,
    ) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database.url = "sqlite::memory:".to_string();
        config.storage.root_path = dir.path().join("storage").to_string_lossy().into_owned();
        adjust(&mut config);

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let provider = LocalStorageProvider::new(&config.storage.root_path)
            .await
            .expect("Failed to init storage");
        let services = Services::new(&db, wrap(Arc::new(provider)), &config);

        Self {
            services,
            db,
            config,
            dir,
            extra_dirs: Vec::new(),
        }
    }

    /// Context for a fresh user
    pub fn user(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Initialize an upload with no metadata
    pub async fn initialize(
        &self,
        ctx: &RequestContext,
        name: &str,
        mime_type: &str,
        size: u64,
    ) -> File {
        self.services
            .upload
            .initialize(
                ctx,
                InitializeUpload {
                    name: name.to_string(),
                    mime_type: mime_type.to_string(),
                    size_bytes: size,
                    metadata: FileMetadata::default(),
                },
            )
            .await
            .expect("Failed to initialize upload")
    }

    /// Run a whole upload: initialize, one chunk per slice, complete
    pub async fn upload(&self, ctx: &RequestContext, name: &str, chunks: &[&[u8]]) -> File {
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let file = self.initialize(ctx, name, "text/plain", total as u64).await;
        for (n, chunk) in chunks.iter().enumerate() {
            self.services
                .upload
                .upload_chunk(ctx, file.id, n as i32, Bytes::copy_from_slice(chunk))
                .await
                .expect("Failed to upload chunk");
        }
        self.services
            .upload
            .complete(ctx, file.id)
            .await
            .expect("Failed to complete upload")
    }

    /// Absolute path of a stored object
    pub fn blob_path(&self, storage_path: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.root_path).join(storage_path)
    }

    /// Staged chunk files still on disk for a file
    pub fn staged_chunk_files(&self, file: &File) -> usize {
        let dir = PathBuf::from(&self.config.storage.root_path)
            .join(&self.config.storage.chunk_dir)
            .join(file.id.to_string());
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }
}

/// Storage wrapper whose `delete_dir` can be switched to fail, for breaking
/// the chunk purge that runs after the artifact is written
#[derive(Debug)]
pub struct FailingPurge {
    inner: Arc<dyn StorageProvider>,
    /// When set, `delete_dir` fails
    pub fail: AtomicBool,
}

impl FailingPurge {
    /// Wrap `inner`, failing purges from the start
    pub fn new(inner: Arc<dyn StorageProvider>) -> Self {
        Self {
            inner,
            fail: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl StorageProvider for FailingPurge {
    fn provider_type(&self) -> &str {
        "failing-purge"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        self.inner.read(path).await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.inner.delete(path).await
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Refusing to delete {path}")));
        }
        self.inner.delete_dir(path).await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }
}
