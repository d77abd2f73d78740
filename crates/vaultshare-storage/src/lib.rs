//! # vaultshare-storage
//!
//! Blob storage for VaultShare: the local filesystem provider, the chunk
//! staging area used during uploads, and the assembler that concatenates
//! staged chunks back into plaintext.

pub mod chunked;
pub mod paths;
pub mod providers;
pub mod retry;

pub use chunked::{AssembledContent, ChunkAssembler, ChunkStore};
pub use providers::local::LocalStorageProvider;
pub use retry::with_retry;
