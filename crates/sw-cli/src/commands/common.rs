//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use sw_core::config::ConfigFile;
use sw_core::MigrationConfig;
use sw_migrate::Migrator;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already printed its message
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Settings given on the command line or through `STEPWISE_*` variables
fn overrides(global: &GlobalArgs) -> ConfigFile {
    ConfigFile {
        project_name: global.project.clone(),
        engine: global.engine,
        connection_string_ddl: global.ddl.clone(),
        connection_string_master: global.master.clone(),
        scripts_root: global.scripts_root.clone(),
        script_timeout_secs: global.timeout,
    }
}

/// Resolve the configuration: config file first, then flag and env overrides.
///
/// Without `--config` a missing `stepwise.yml` is fine as long as the
/// overrides supply the required values.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<MigrationConfig> {
    let file = match &global.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigFile::load_from_dir(&global.project_dir)
            .with_context(|| {
                format!(
                    "Failed to load config from {}",
                    global.project_dir.display()
                )
            })?
            .unwrap_or_default(),
    };

    file.merge(overrides(global))
        .into_config()
        .context("Invalid configuration")
}

/// Build a migrator from the resolved configuration
pub(crate) fn build_migrator(global: &GlobalArgs) -> Result<Migrator> {
    let config = load_config(global)?;
    log::debug!(
        "Project '{}' on {} (master connection {})",
        config.project_name,
        config.engine,
        if config.connection_string_master.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    Migrator::new(config).context("Failed to set up migration")
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
