//! Storage key layout.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vaultshare_core::types::id::{ChunkId, FileId, UserId};

/// Longest extension carried over from a display name into a blob key.
const MAX_EXTENSION_LEN: usize = 16;

/// Canonical key for a new encrypted artifact:
/// `files/{owner}/{YYYYmmdd_HHMMSS}_{uuid}.{ext}`.
///
/// The display name only contributes its extension, so the key length does
/// not depend on how long the name is.
pub fn blob_path(owner_id: UserId, name: &str, now: DateTime<Utc>) -> String {
    let stem = format!(
        "files/{owner_id}/{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        Uuid::new_v4()
    );
    match extension(name) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Lowercase extension of `name` when it is short and ASCII alphanumeric.
fn extension(name: &str) -> Option<String> {
    let (base, ext) = name.rsplit_once('.')?;
    if base.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Staging directory holding every chunk of one file.
pub fn chunk_dir(prefix: &str, file_id: FileId) -> String {
    format!("{}/{file_id}", prefix.trim_end_matches('/'))
}

/// Staging key for one chunk. The chunk id keeps concurrent writers of the
/// same number from sharing a path.
pub fn chunk_path(prefix: &str, file_id: FileId, chunk_number: i32, chunk_id: ChunkId) -> String {
    format!("{}/{chunk_number:06}-{chunk_id}", chunk_dir(prefix, file_id))
}
