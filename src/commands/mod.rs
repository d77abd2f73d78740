//! CLI command definitions and dispatch.

pub mod copy;
pub mod delete;
pub mod list;
pub mod migrate;
pub mod read;
pub mod rename;
pub mod restore;
pub mod trash;
pub mod upload;
pub mod versions;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_core::traits::storage::StorageProvider;
use vaultshare_core::types::id::UserId;
use vaultshare_database::DatabasePool;
use vaultshare_database::migration::run_migrations;
use vaultshare_service::{RequestContext, Services};
use vaultshare_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// VaultShare: encrypted file storage
#[derive(Debug, Parser)]
#[command(name = "vaultshare", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate(migrate::MigrateArgs),
    /// Upload a local file in chunks
    Upload(upload::UploadArgs),
    /// Decrypt a file (or one of its versions) to disk
    Read(read::ReadArgs),
    /// List, search, or show recent files
    List(list::ListArgs),
    /// List soft-deleted files
    Trash(trash::TrashArgs),
    /// Show or create versions of a file
    Versions(versions::VersionsArgs),
    /// Copy files under fresh keys
    Copy(copy::CopyArgs),
    /// Rename a file
    Rename(rename::RenameArgs),
    /// Move files to the trash
    Delete(delete::DeleteArgs),
    /// Restore a file from the trash
    Restore(restore::RestoreArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Upload(args) => upload::execute(args, config, self.format).await,
            Commands::Read(args) => read::execute(args, config).await,
            Commands::List(args) => list::execute(args, config, self.format).await,
            Commands::Trash(args) => trash::execute(args, config, self.format).await,
            Commands::Versions(args) => versions::execute(args, config, self.format).await,
            Commands::Copy(args) => copy::execute(args, config, self.format).await,
            Commands::Rename(args) => rename::execute(args, config, self.format).await,
            Commands::Delete(args) => delete::execute(args, config, self.format).await,
            Commands::Restore(args) => restore::execute(args, config, self.format).await,
        }
    }
}

/// Acting user, shared by every file command.
#[derive(Debug, Clone, clap::Args)]
pub struct OwnerArg {
    /// Owner (acting user) ID
    #[arg(long)]
    pub owner: UserId,
}

impl OwnerArg {
    /// Request context for the acting user.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.owner)
    }
}

/// Helper: connect to the database and apply pending migrations
pub async fn connect_db(config: &AppConfig) -> Result<DatabasePool, AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    Ok(db)
}

/// Helper: build the service graph from configuration
pub async fn build_services(config: &AppConfig) -> Result<Services, AppError> {
    let db = connect_db(config).await?;
    let provider = LocalStorageProvider::new(&config.storage.root_path).await?;
    if !provider.health_check().await? {
        return Err(AppError::storage(format!(
            "Storage root {} is not a usable directory",
            config.storage.root_path
        )));
    }
    tracing::debug!(
        provider = provider.provider_type(),
        root = %config.storage.root_path,
        "Storage ready"
    );
    Ok(Services::new(&db, Arc::new(provider), config))
}
