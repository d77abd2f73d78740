//! File lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upload lifecycle of a file record.
///
/// `Pending -> Uploading -> Processing -> Completed | Failed`. The two
/// terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatus {
    /// Record created, no bytes yet.
    Pending,
    /// Accepting chunks.
    Uploading,
    /// Assembly and encryption in flight.
    Processing,
    /// Encrypted artifact persisted and readable.
    Completed,
    /// Processing failed; the record is not readable.
    Failed,
}

impl FileStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Uploading)
                | (Self::Uploading, Self::Processing)
                | (Self::Processing, Self::Uploading)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Return the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Uploading => "UPLOADING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
