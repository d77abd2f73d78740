//! Storage provider trait for pluggable blob storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends holding staged chunks and encrypted
/// artifacts.
///
/// Paths are relative, `/`-separated keys. A successful [`write`] must be
/// all-or-nothing: a reader never observes a partially written object at
/// the target path.
///
/// [`write`]: StorageProvider::write
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read an object into memory as a complete byte buffer.
    ///
    /// Returns an [`ErrorKind::NotFound`](crate::error::ErrorKind::NotFound)
    /// error when nothing is stored at `path`.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Atomically write bytes to an object at the given path, replacing
    /// any previous content.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete a directory prefix and everything beneath it.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
