//! Staged upload chunk entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vaultshare_core::types::id::{ChunkId, FileId};

/// One caller-supplied slice of a file, staged until completion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileChunk {
    /// Unique chunk identifier.
    pub id: ChunkId,
    /// The file this chunk belongs to.
    pub file_id: FileId,
    /// Zero-based position within the file.
    pub chunk_number: i32,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Lowercase hex SHA-256 computed when the chunk was written.
    pub checksum_sha256: String,
    /// Whether the bytes are durably staged.
    pub uploaded: bool,
    /// Staging path within storage.
    pub storage_path: String,
    /// When the chunk was received.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a staged chunk.
#[derive(Debug, Clone)]
pub struct CreateChunk {
    pub id: ChunkId,
    pub file_id: FileId,
    pub chunk_number: i32,
    pub size_bytes: i64,
    pub checksum_sha256: String,
    pub storage_path: String,
}
