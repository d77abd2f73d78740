//! Version history command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::types::id::FileId;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the versions command
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// File whose history to show
    pub file_id: FileId,

    #[command(flatten)]
    pub owner: OwnerArg,

    /// Snapshot the current content first, with this comment
    #[arg(long)]
    pub snapshot: Option<String>,
}

/// Execute the versions command
pub async fn execute(
    args: &VersionsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let ctx = args.owner.context();

    if let Some(comment) = &args.snapshot {
        let version = services
            .versions
            .create_version(&ctx, args.file_id, comment)
            .await?;
        if format == OutputFormat::Table {
            output::print_success(&format!("Created version {}", version.version_number));
        }
    }

    let versions = services.versions.list_versions(&ctx, args.file_id).await?;
    output::print_versions(&versions, format);
    Ok(())
}
