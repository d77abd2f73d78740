//! Soft-delete command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Files to move to the trash
    #[arg(required = true)]
    pub file_ids: Vec<FileId>,

    #[command(flatten)]
    pub owner: OwnerArg,
}

/// Execute the delete command
pub async fn execute(
    args: &DeleteArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let ctx = args.owner.context();

    let deleted = match args.file_ids.as_slice() {
        [file_id] => vec![services.files.soft_delete(&ctx, *file_id).await?],
        ids => services.files.bulk_soft_delete(&ctx, ids).await?,
    };

    if format == OutputFormat::Table {
        output::print_success(&format!("Moved {} file(s) to the trash", deleted.len()));
    }
    output::print_files(&deleted, format);
    Ok(())
}
