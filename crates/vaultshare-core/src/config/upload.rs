//! Upload policy configuration.

use serde::{Deserialize, Serialize};

/// MIME types accepted by `initialize` unless overridden.
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/zip",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
];

/// Upload limits and allow-lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum file size in bytes (default 5 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Suggested chunk size in bytes handed to callers (default 5 MB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: u64,
    /// Accepted MIME types.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Chunk numbers must be below this.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: u32,
    /// Seconds a file may sit in `PROCESSING` before the next access
    /// treats it as abandoned and fails it.
    #[serde(default = "default_processing_timeout")]
    pub processing_timeout_secs: u64,
}

impl UploadConfig {
    /// Whether `mime_type` is on the allow-list (exact match).
    pub fn is_allowed_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|m| m == mime_type)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: default_max_upload(),
            chunk_size_bytes: default_chunk_size(),
            allowed_mime_types: default_allowed_mime_types(),
            max_chunks: default_max_chunks(),
            processing_timeout_secs: default_processing_timeout(),
        }
    }
}

fn default_max_upload() -> u64 {
    5_368_709_120 // 5 GB
}

fn default_chunk_size() -> u64 {
    5_242_880 // 5 MB
}

fn default_max_chunks() -> u32 {
    10_000
}

fn default_processing_timeout() -> u64 {
    900
}

fn default_allowed_mime_types() -> Vec<String> {
    DEFAULT_ALLOWED_MIME_TYPES
        .iter()
        .map(|m| (*m).to_string())
        .collect()
}
