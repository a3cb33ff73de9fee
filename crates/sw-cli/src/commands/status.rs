//! Status command implementation

use anyhow::{Context, Result};
use sw_migrate::MigrationStatus;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::build_migrator;

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    let status = migrator
        .status()
        .await
        .context("Failed to read migration status")?;

    match args.output {
        OutputFormat::Text => print_status(&status),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&status).context("Failed to serialize to JSON")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn print_status(status: &MigrationStatus) {
    println!("Project:      {} ({})", status.project_name, status.engine);
    println!("Scripts root: {}", status.scripts_root.display());
    println!(
        "Database:     {}",
        if status.database_exists {
            "exists"
        } else {
            "missing"
        }
    );
    match status.current_version {
        Some(version) => println!("Version:      {}", version),
        None => println!("Version:      none"),
    }
    if status.updating {
        match status.target_version {
            Some(target) => println!("In flight:    version {} (blocked)", target),
            None => println!("In flight:    yes (blocked)"),
        }
    }
    if status.bootstrap_pending {
        println!("00_CreateDB:  pending");
    }

    if !status.pending.is_empty() {
        println!();
        println!("{:<8}  {:>7}  PATH", "VERSION", "SCRIPTS");
        for folder in &status.pending {
            println!(
                "{:<8}  {:>7}  {}",
                folder.version,
                folder.scripts,
                folder.path.display()
            );
        }
    }

    if !status.ignored.is_empty() {
        println!();
        println!("Ignored folders:");
        for path in &status.ignored {
            println!("  {}", path.display());
        }
    }

    println!();
    if status.is_up_to_date() {
        println!("Up to date");
    } else {
        println!("{} folder(s) pending", status.pending.len());
    }
}
