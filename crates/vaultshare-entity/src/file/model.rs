//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vaultshare_core::types::id::{FileId, UserId};

use super::status::FileStatus;

/// A file owned by a single user, stored encrypted at rest.
///
/// `checksum_sha256` and `size_bytes` are authoritative only once `status`
/// is [`FileStatus::Completed`]; before that `size_bytes` holds the size the
/// caller declared.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// Sanitized display name.
    pub name: String,
    /// Name as supplied by the uploader.
    pub original_name: String,
    /// MIME type of the plaintext.
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size_bytes: i64,
    /// Canonical path of the encrypted artifact within storage.
    pub storage_path: String,
    /// Base64 per-file base key.
    #[serde(skip_serializing, default)]
    pub encryption_key: String,
    /// Base64 IV of the current artifact.
    #[serde(skip_serializing, default)]
    pub iv: String,
    /// Lowercase hex SHA-256 of the plaintext.
    pub checksum_sha256: Option<String>,
    /// Lifecycle status.
    pub status: FileStatus,
    /// Highest version number ever allocated for this file.
    pub current_version: i32,
    /// Free-text description.
    pub description: Option<String>,
    /// Tags (JSON array of strings).
    pub tags: serde_json::Value,
    /// Arbitrary metadata (JSON object).
    pub metadata: serde_json::Value,
    /// Whether the file is in the trash.
    pub is_deleted: bool,
    /// When the file was moved to the trash.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the upload was initialized.
    pub upload_started_at: DateTime<Utc>,
    /// When processing completed.
    pub upload_completed_at: Option<DateTime<Utc>>,
    /// Last successful read.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Whether `user` owns this file.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Tags as a list of strings; non-string entries are ignored.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone)]
pub struct CreateFile {
    /// Identifier allocated by the caller (also used in the storage path).
    pub id: FileId,
    /// The file owner.
    pub owner_id: UserId,
    /// Sanitized display name.
    pub name: String,
    /// Name as supplied.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Declared size in bytes.
    pub size_bytes: i64,
    /// Canonical artifact path.
    pub storage_path: String,
    /// Base64 base key.
    pub encryption_key: String,
    /// Base64 IV.
    pub iv: String,
    /// Initial status.
    pub status: FileStatus,
    /// Free-text description.
    pub description: Option<String>,
    /// Tags (JSON array).
    pub tags: serde_json::Value,
    /// Metadata (JSON object).
    pub metadata: serde_json::Value,
}
