//! Core traits defined in `vaultshare-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
