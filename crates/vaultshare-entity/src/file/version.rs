//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vaultshare_core::types::id::{FileId, FileVersionId, UserId};

/// An immutable, self-contained encrypted snapshot of a file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: FileVersionId,
    /// The file this version belongs to.
    pub file_id: FileId,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// Path to this version's encrypted artifact.
    pub storage_path: String,
    /// Base64 key of this artifact.
    #[serde(skip_serializing, default)]
    pub encryption_key: String,
    /// Base64 IV of this artifact.
    #[serde(skip_serializing, default)]
    pub iv: String,
    /// SHA-256 of the plaintext.
    pub checksum_sha256: String,
    /// Plaintext size in bytes.
    pub size_bytes: i64,
    /// User who created this version.
    pub created_by: UserId,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// Comment describing the change.
    pub comment: String,
    /// Arbitrary metadata.
    pub metadata: serde_json::Value,
}

/// Data required to create a version. The number is allocated by the
/// repository.
#[derive(Debug, Clone)]
pub struct CreateVersion {
    pub file_id: FileId,
    pub storage_path: String,
    pub encryption_key: String,
    pub iv: String,
    pub checksum_sha256: String,
    pub size_bytes: i64,
    pub created_by: UserId,
    pub comment: String,
    pub metadata: serde_json::Value,
}
