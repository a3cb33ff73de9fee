//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 30;

/// Database engine tag.
///
/// The display form doubles as the folder name under `Scripts/`, so a
/// Postgres project keeps its migrations in `<Project>.Database/Scripts/Postgres`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DbKind {
    /// PostgreSQL (default)
    #[default]
    Postgres,
    /// DuckDB, file-based
    DuckDb,
    /// Microsoft SQL Server (recognized, no driver)
    SqlServer,
}

impl DbKind {
    /// Folder name under `Scripts/` holding this engine's migrations
    pub fn folder_name(&self) -> &'static str {
        match self {
            DbKind::Postgres => "Postgres",
            DbKind::DuckDb => "DuckDb",
            DbKind::SqlServer => "SqlServer",
        }
    }
}

impl std::fmt::Display for DbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.folder_name())
    }
}

impl FromStr for DbKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbKind::Postgres),
            "duckdb" => Ok(DbKind::DuckDb),
            "sqlserver" | "mssql" => Ok(DbKind::SqlServer),
            _ => Err(CoreError::UnsupportedEngine {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DbKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DbKind> for String {
    fn from(kind: DbKind) -> Self {
        kind.folder_name().to_string()
    }
}

/// Contents of `stepwise.yml`.
///
/// Every field is optional here because command-line flags and environment
/// variables may supply whatever the file leaves out. [`ConfigFile::into_config`]
/// enforces the required fields once all layers are merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Project name, also the key of the version row
    #[serde(default)]
    pub project_name: Option<String>,

    /// Database engine tag
    #[serde(default)]
    pub engine: Option<DbKind>,

    /// Connection string of a user with DDL rights
    #[serde(default)]
    pub connection_string_ddl: Option<String>,

    /// Superuser connection string; enables the bootstrap folder
    #[serde(default)]
    pub connection_string_master: Option<String>,

    /// Explicit scripts root, bypasses the upward folder search
    #[serde(default)]
    pub scripts_root: Option<PathBuf>,

    /// Per-script execution timeout in seconds
    #[serde(default)]
    pub script_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::io_with_path(path, e))?;
        let mut file: ConfigFile = serde_yaml::from_str(&content)?;

        // A relative scripts root is relative to the config file, not the cwd
        if let (Some(root), Some(parent)) = (&file.scripts_root, path.parent()) {
            if root.is_relative() {
                file.scripts_root = Some(parent.join(root));
            }
        }
        Ok(file)
    }

    /// Load `stepwise.yml` or `stepwise.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> CoreResult<Option<Self>> {
        let yml_path = dir.join("stepwise.yml");
        let yaml_path = dir.join("stepwise.yaml");

        if yml_path.exists() {
            Self::load(&yml_path).map(Some)
        } else if yaml_path.exists() {
            Self::load(&yaml_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            project_name: overrides.project_name.or(self.project_name),
            engine: overrides.engine.or(self.engine),
            connection_string_ddl: overrides
                .connection_string_ddl
                .or(self.connection_string_ddl),
            connection_string_master: overrides
                .connection_string_master
                .or(self.connection_string_master),
            scripts_root: overrides.scripts_root.or(self.scripts_root),
            script_timeout_secs: overrides.script_timeout_secs.or(self.script_timeout_secs),
        }
    }

    /// Validate and convert into a [`MigrationConfig`]
    pub fn into_config(self) -> CoreResult<MigrationConfig> {
        let project_name = self.project_name.unwrap_or_default();
        let connection_string_ddl = self.connection_string_ddl.unwrap_or_default();

        let config = MigrationConfig {
            project_name,
            engine: self.engine.unwrap_or_default(),
            connection_string_ddl,
            connection_string_master: self
                .connection_string_master
                .filter(|s| !s.trim().is_empty()),
            scripts_root: self.scripts_root,
            script_timeout: Duration::from_secs(
                self.script_timeout_secs
                    .unwrap_or(DEFAULT_SCRIPT_TIMEOUT_SECS),
            ),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validated settings for one migration run
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Project name, also the key of the version row
    pub project_name: String,

    /// Database engine
    pub engine: DbKind,

    /// Connection string of a user with DDL rights
    pub connection_string_ddl: String,

    /// Superuser connection string; `None` disables bootstrap
    pub connection_string_master: Option<String>,

    /// Explicit scripts root, bypasses the upward folder search
    pub scripts_root: Option<PathBuf>,

    /// Per-script execution timeout handed to the driver
    pub script_timeout: Duration,
}

impl MigrationConfig {
    /// Minimal configuration: no bootstrap, scripts located by folder search
    pub fn new(
        project_name: impl Into<String>,
        engine: DbKind,
        connection_string_ddl: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            engine,
            connection_string_ddl: connection_string_ddl.into(),
            connection_string_master: None,
            scripts_root: None,
            script_timeout: Duration::from_secs(DEFAULT_SCRIPT_TIMEOUT_SECS),
        }
    }

    /// Set the superuser connection string
    pub fn with_master(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string_master = Some(connection_string.into());
        self
    }

    /// Set an explicit scripts root
    pub fn with_scripts_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scripts_root = Some(root.into());
        self
    }

    /// Set the per-script timeout
    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.project_name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.connection_string_ddl.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "A DDL connection string is required".to_string(),
            });
        }

        if self.script_timeout.is_zero() {
            return Err(CoreError::ConfigInvalid {
                message: "script_timeout_secs must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
