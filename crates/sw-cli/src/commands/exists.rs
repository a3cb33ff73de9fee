//! Exists command implementation
//!
//! Exits with status 0 when the target database exists and 1 when it does not.

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{build_migrator, ExitCode};

/// Execute the exists command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    let exists = migrator
        .database_exists()
        .await
        .context("Failed to check whether the database exists")?;

    if exists {
        println!("Database of project '{}' exists", migrator.config().project_name);
        Ok(())
    } else {
        println!(
            "Database of project '{}' does not exist",
            migrator.config().project_name
        );
        Err(ExitCode(1).into())
    }
}
