//! Unified application error types for VaultShare.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Transport codes (HTTP status and
//! the like) are chosen by the caller from [`ErrorKind`]; nothing in the
//! core knows about them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::id::FileId;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested record or blob was not found.
    NotFound,
    /// The actor does not own the file (and holds no applicable grant).
    AccessDenied,
    /// Bad file name, metadata, or other malformed input.
    InvalidRequest,
    /// The MIME type is not on the upload allow-list.
    InvalidFileType,
    /// The operation is not valid in the file's current lifecycle state.
    InvalidState,
    /// A chunk with the same number was already uploaded for this file.
    ChunkConflict,
    /// The uploaded chunks do not form a contiguous `0..N-1` sequence.
    MissingChunks,
    /// Ciphertext could not be decrypted or failed its integrity check.
    Decryption,
    /// A storage I/O error occurred.
    Storage,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::InvalidState => "INVALID_STATE",
            Self::ChunkConflict => "CHUNK_CONFLICT",
            Self::MissingChunks => "MISSING_CHUNKS",
            Self::Decryption => "DECRYPTION_ERROR",
            Self::Storage => "STORAGE",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured context attached to an error so callers can render a
/// precise message without parsing [`AppError::message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorDetail {
    /// The file is not in the state the operation requires.
    InvalidState {
        /// The file the operation targeted.
        file_id: FileId,
        /// The state the operation requires.
        expected: String,
        /// The state the file was actually in.
        actual: String,
    },
    /// A chunk number was reused.
    ChunkConflict {
        /// The file being uploaded.
        file_id: FileId,
        /// The duplicate chunk number.
        chunk_number: i32,
    },
    /// Completion found gaps in the chunk sequence.
    MissingChunks {
        /// The file being completed.
        file_id: FileId,
        /// The lowest chunk numbers absent from `0..=max_received`.
        missing: Vec<i32>,
        /// How many chunk numbers are absent in total.
        missing_count: usize,
        /// How many chunks were actually present.
        received: usize,
    },
    /// The error concerns a single file record.
    File {
        /// The file involved.
        file_id: FileId,
    },
}

/// The unified application error used throughout VaultShare.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured context, when the failure concerns a specific file.
    pub detail: Option<ErrorDetail>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured detail to this error.
    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Attach the file this error concerns, unless a richer detail is set.
    pub fn for_file(mut self, file_id: FileId) -> Self {
        if self.detail.is_none() {
            self.detail = Some(ErrorDetail::File { file_id });
        }
        self
    }

    /// Whether this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an access-denied error for a file.
    pub fn access_denied(file_id: FileId) -> Self {
        Self::new(
            ErrorKind::AccessDenied,
            format!("Access to file {file_id} denied"),
        )
        .with_detail(ErrorDetail::File { file_id })
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Create an invalid-file-type error.
    pub fn invalid_file_type(mime_type: &str) -> Self {
        Self::new(
            ErrorKind::InvalidFileType,
            format!("File type '{mime_type}' is not allowed"),
        )
    }

    /// Create an invalid-state error.
    pub fn invalid_state(
        file_id: FileId,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self::new(
            ErrorKind::InvalidState,
            format!("File {file_id} is {actual}, expected {expected}"),
        )
        .with_detail(ErrorDetail::InvalidState {
            file_id,
            expected,
            actual,
        })
    }

    /// Create a chunk-conflict error.
    pub fn chunk_conflict(file_id: FileId, chunk_number: i32) -> Self {
        Self::new(
            ErrorKind::ChunkConflict,
            format!("Chunk {chunk_number} of file {file_id} was already uploaded"),
        )
        .with_detail(ErrorDetail::ChunkConflict {
            file_id,
            chunk_number,
        })
    }

    /// Create a missing-chunks error.
    ///
    /// `missing` may be a prefix of the absent numbers; `missing_count` is
    /// the full count.
    pub fn missing_chunks(
        file_id: FileId,
        missing: Vec<i32>,
        missing_count: usize,
        received: usize,
    ) -> Self {
        let more = if missing_count > missing.len() {
            format!(" and {} more", missing_count - missing.len())
        } else {
            String::new()
        };
        Self::new(
            ErrorKind::MissingChunks,
            format!("File {file_id} is missing chunks {missing:?}{more} ({received} received)"),
        )
        .with_detail(ErrorDetail::MissingChunks {
            file_id,
            missing,
            missing_count,
            received,
        })
    }

    /// Create a decryption error.
    pub fn decryption(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decryption, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            detail: self.detail.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err)
    }
}
