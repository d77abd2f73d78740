//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration for encrypted artifacts and staged chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the local storage provider.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Prefix (relative to the root) under which chunks are staged.
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: String,
    /// Retries allowed for a failed blob read or write (0 or 1).
    #[serde(default = "default_io_retries")]
    pub io_retries: u32,
    /// Re-hash decrypted content on read and compare to the stored checksum.
    #[serde(default = "default_true")]
    pub verify_checksum_on_read: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            chunk_dir: default_chunk_dir(),
            io_retries: default_io_retries(),
            verify_checksum_on_read: true,
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_chunk_dir() -> String {
    "_chunks".to_string()
}

fn default_io_retries() -> u32 {
    1
}

fn default_true() -> bool {
    true
}
