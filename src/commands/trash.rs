//! Trash listing command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the trash command
#[derive(Debug, Args)]
pub struct TrashArgs {
    #[command(flatten)]
    pub owner: OwnerArg,
}

/// Execute the trash command
pub async fn execute(
    args: &TrashArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let files = services.files.list_trash(&args.owner.context()).await?;
    output::print_files(&files, format);
    Ok(())
}
