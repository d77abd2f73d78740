//! File read command.

use std::path::PathBuf;

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output;

/// Arguments for the read command
#[derive(Debug, Args)]
pub struct ReadArgs {
    /// File to read
    pub file_id: FileId,

    #[command(flatten)]
    pub owner: OwnerArg,

    /// Destination path for the plaintext
    #[arg(short, long)]
    pub out: PathBuf,

    /// Read this version instead of the current content
    #[arg(long)]
    pub version: Option<i32>,
}

/// Execute the read command
pub async fn execute(args: &ReadArgs, config: &AppConfig) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let ctx = args.owner.context();

    let result = match args.version {
        Some(n) => services.download.read_version(&ctx, args.file_id, n).await?,
        None => services.download.read(&ctx, args.file_id).await?,
    };
    tokio::fs::write(&args.out, &result.data).await?;

    output::print_success(&format!(
        "Wrote {} bytes of '{}' ({}) to {}",
        result.size(),
        result.original_name,
        result.mime_type,
        args.out.display()
    ));
    Ok(())
}
