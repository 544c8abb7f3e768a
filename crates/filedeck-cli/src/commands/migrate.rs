//! Database migration management commands.

use clap::{Args, Subcommand};

use filedeck_core::config::AppConfig;
use filedeck_core::error::AppError;
use filedeck_database::DatabasePool;
use filedeck_database::migration::{MIGRATOR, run_migrations};

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// List the migrations bundled with this build
    List,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let mut database = config.database.clone();
            database.run_migrations = false;
            let pool = DatabasePool::connect(&database).await?;

            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            pool.close().await;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::List => {
            for migration in MIGRATOR.iter() {
                println!("  {:>16}  {}", migration.version, migration.description);
            }
        }
    }

    Ok(())
}
