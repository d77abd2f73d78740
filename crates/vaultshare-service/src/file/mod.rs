//! File services: upload pipeline, read path, lifecycle, versions, copies.

pub mod copy;
pub mod download;
pub mod naming;
pub mod recovery;
pub mod service;
pub mod upload;
pub mod version;

pub use copy::CopyService;
pub use download::{DownloadService, ReadResult};
pub use recovery::StaleProcessing;
pub use service::FileService;
pub use upload::{InitializeUpload, UploadService};
pub use version::{Artifact, VersionService};

use vaultshare_core::error::{AppError, ErrorKind};
use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::FileId;
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::{File, FileStatus};

use crate::context::RequestContext;

/// Load a file the acting user owns.
///
/// `NotFound` when there is no such record, `AccessDenied` when it belongs
/// to someone else.
pub(crate) async fn load_owned(
    files: &FileRepository,
    ctx: &RequestContext,
    file_id: FileId,
) -> AppResult<File> {
    let file = files
        .find_by_id(file_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")).for_file(file_id))?;
    if !file.is_owned_by(ctx.user_id) {
        return Err(AppError::access_denied(file_id));
    }
    Ok(file)
}

/// Fail with `InvalidState` unless `file` is in `expected`.
pub(crate) fn require_status(file: &File, expected: FileStatus) -> AppResult<()> {
    if file.status == expected {
        Ok(())
    } else {
        Err(AppError::invalid_state(
            file.id,
            expected.as_str(),
            file.status.as_str(),
        ))
    }
}

/// Whether a bulk operation should skip this error instead of aborting.
pub(crate) fn is_skippable(err: &AppError) -> bool {
    err.is(ErrorKind::NotFound) || err.is(ErrorKind::AccessDenied)
}

/// Run CPU-heavy work off the async runtime.
pub(crate) async fn blocking<T, F>(task: &'static str, f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("{task} panicked"), e))
}
