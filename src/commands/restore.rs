//! Restore-from-trash command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the restore command
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// File to restore
    pub file_id: FileId,

    #[command(flatten)]
    pub owner: OwnerArg,
}

/// Execute the restore command
pub async fn execute(
    args: &RestoreArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let file = services
        .files
        .restore(&args.owner.context(), args.file_id)
        .await?;
    output::print_file(&file, format);
    Ok(())
}
