//! File lifecycle and listing operations that never touch encrypted content.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use vaultshare_core::result::AppResult;
use vaultshare_core::types::id::FileId;
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::File;

use super::naming::sanitize_filename;
use crate::context::RequestContext;

/// Default page size for [`FileService::recent_files`].
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Owner-scoped file lookups, renames, and trash handling.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File repository.
    files: FileRepository,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(files: FileRepository) -> Self {
        Self { files }
    }

    /// Gets a file the caller owns.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        super::load_owned(&self.files, ctx, file_id).await
    }

    /// The caller's completed files, newest first.
    pub async fn list_files(&self, ctx: &RequestContext) -> AppResult<Vec<File>> {
        self.files.list_completed(ctx.user_id).await
    }

    /// Case-insensitive name search over the caller's live files. A blank
    /// query returns all of them.
    pub async fn search_files(&self, ctx: &RequestContext, query: &str) -> AppResult<Vec<File>> {
        self.files.search(ctx.user_id, query.trim()).await
    }

    /// Most recently touched live files; `None` means [`DEFAULT_RECENT_LIMIT`].
    pub async fn recent_files(
        &self,
        ctx: &RequestContext,
        limit: Option<u32>,
    ) -> AppResult<Vec<File>> {
        self.files
            .recent(ctx.user_id, limit.unwrap_or(DEFAULT_RECENT_LIMIT))
            .await
    }

    /// The caller's trash.
    pub async fn list_trash(&self, ctx: &RequestContext) -> AppResult<Vec<File>> {
        self.files.list_deleted(ctx.user_id).await
    }

    /// Renames a file. Content and storage path are left alone.
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        new_name: &str,
    ) -> AppResult<File> {
        let name = sanitize_filename(new_name)?;
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        if file.name == name {
            return Ok(file);
        }

        let renamed = self.files.rename(file_id, &name).await?;
        info!(
            request_id = %ctx.request_id,
            file_id = %file_id,
            from = %file.name,
            to = %renamed.name,
            "File renamed"
        );
        Ok(renamed)
    }

    /// Moves a file to the trash. Already-deleted files are returned as is.
    pub async fn soft_delete(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        if file.is_deleted {
            debug!(file_id = %file_id, "File already in trash");
            return Ok(file);
        }

        let deleted = self.files.soft_delete(file_id, Utc::now()).await?;
        info!(request_id = %ctx.request_id, file_id = %file_id, "File moved to trash");
        Ok(deleted)
    }

    /// Takes a file out of the trash. Live files are returned unchanged.
    pub async fn restore(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<File> {
        let file = super::load_owned(&self.files, ctx, file_id).await?;
        if !file.is_deleted {
            debug!(file_id = %file_id, "File not in trash");
            return Ok(file);
        }

        let restored = self.files.restore(file_id).await?;
        info!(request_id = %ctx.request_id, file_id = %file_id, "File restored");
        Ok(restored)
    }

    /// Trashes every listed file the caller owns. Missing and foreign ids
    /// are skipped.
    pub async fn bulk_soft_delete(
        &self,
        ctx: &RequestContext,
        file_ids: &[FileId],
    ) -> AppResult<Vec<File>> {
        let mut done = Vec::with_capacity(file_ids.len());
        for &file_id in file_ids {
            match self.soft_delete(ctx, file_id).await {
                Ok(file) => done.push(file),
                Err(e) if super::is_skippable(&e) => {
                    debug!(file_id = %file_id, error = %e, "Skipping file in bulk delete");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }

    /// Renames every listed file the caller owns. Missing and foreign ids
    /// are skipped; an invalid name aborts the batch.
    pub async fn bulk_rename(
        &self,
        ctx: &RequestContext,
        renames: &HashMap<FileId, String>,
    ) -> AppResult<Vec<File>> {
        let mut done = Vec::with_capacity(renames.len());
        for (&file_id, name) in renames {
            match self.move_file(ctx, file_id, name).await {
                Ok(file) => done.push(file),
                Err(e) if super::is_skippable(&e) => {
                    debug!(file_id = %file_id, error = %e, "Skipping file in bulk rename");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }
}
