//! Database migration command.

use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_database::DatabasePool;
use vaultshare_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Only check that the database is reachable
    #[arg(long)]
    pub check: bool,
}

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    if args.check {
        db.health_check().await?;
        output::print_success("Database is reachable.");
    } else {
        println!("Running database migrations...");
        run_migrations(db.pool()).await?;
        output::print_success("All migrations applied successfully.");
    }

    db.close().await;
    Ok(())
}
