//! # vaultshare-service
//!
//! Business logic service layer for VaultShare: the chunked upload
//! pipeline, the decrypting read path, file lifecycle operations,
//! versioning, and copies.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time. [`Services`] wires the full graph from a pool,
//! a storage provider, and configuration.

pub mod context;
pub mod file;
pub mod services;

pub use context::RequestContext;
pub use file::{
    CopyService, DownloadService, FileService, InitializeUpload, ReadResult, UploadService,
    VersionService,
};
pub use services::Services;
