//! File rename command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the rename command
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// File to rename
    pub file_id: FileId,

    /// New display name
    pub name: String,

    #[command(flatten)]
    pub owner: OwnerArg,
}

/// Execute the rename command
pub async fn execute(
    args: &RenameArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let file = services
        .files
        .move_file(&args.owner.context(), args.file_id, &args.name)
        .await?;
    output::print_file(&file, format);
    Ok(())
}
