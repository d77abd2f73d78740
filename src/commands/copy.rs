//! File copy command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the copy command
#[derive(Debug, Args)]
pub struct CopyArgs {
    /// Files to copy
    #[arg(required = true)]
    pub file_ids: Vec<FileId>,

    #[command(flatten)]
    pub owner: OwnerArg,
}

/// Execute the copy command
pub async fn execute(
    args: &CopyArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let ctx = args.owner.context();

    let copies = match args.file_ids.as_slice() {
        [file_id] => vec![services.copy.copy(&ctx, *file_id).await?],
        ids => services.copy.bulk_copy(&ctx, ids).await?,
    };

    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Copied {} of {} file(s)",
            copies.len(),
            args.file_ids.len()
        ));
    }
    output::print_files(&copies, format);
    Ok(())
}
