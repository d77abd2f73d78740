//! File listing command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub owner: OwnerArg,

    /// Case-insensitive name search
    #[arg(short, long, conflicts_with = "recent")]
    pub search: Option<String>,

    /// Most recently touched files, optionally limited
    #[arg(long, num_args = 0..=1, default_missing_value = "10")]
    pub recent: Option<u32>,
}

/// Execute the list command
pub async fn execute(
    args: &ListArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::build_services(config).await?;
    let ctx = args.owner.context();

    let files = if let Some(query) = &args.search {
        services.files.search_files(&ctx, query).await?
    } else if let Some(limit) = args.recent {
        services.files.recent_files(&ctx, Some(limit)).await?
    } else {
        services.files.list_files(&ctx).await?
    };

    output::print_files(&files, format);
    Ok(())
}
