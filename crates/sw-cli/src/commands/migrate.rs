//! Migrate command implementation

use anyhow::{Context, Result};
use sw_migrate::MigrationReport;

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{build_migrator, ExitCode};

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    log::info!(
        "Migrating project '{}' ({})",
        migrator.config().project_name,
        migrator.config().engine
    );

    match migrator.run().await {
        Ok(report) => match args.output {
            OutputFormat::Text => {
                print_report(&report);
                Ok(())
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize to JSON")?;
                println!("{}", json);
                Ok(())
            }
        },
        Err(failure) => {
            if args.short {
                eprintln!("{}", failure.short_message);
            } else {
                eprintln!("{}", failure.message);
            }
            Err(ExitCode(1).into())
        }
    }
}

fn join_versions(versions: &[i32]) -> String {
    versions
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_report(report: &MigrationReport) {
    if report.bootstrapped {
        println!("Database created from 00_CreateDB");
    }
    if !report.skipped.is_empty() {
        println!("Already applied: {}", join_versions(&report.skipped));
    }
    if report.applied.is_empty() {
        println!("Nothing to apply");
    } else {
        println!(
            "Applied version{}: {}",
            if report.applied.len() == 1 { "" } else { "s" },
            join_versions(&report.applied)
        );
    }
    println!("Scripts executed: {}", report.scripts_executed);
    match report.current_version {
        Some(version) => println!("Current version: {}", version),
        None => println!("Current version: none"),
    }
}
