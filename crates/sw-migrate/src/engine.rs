//! Migration engine.
//!
//! A run works through three phases:
//!
//! 1. Discovery of the `00_CreateDB` and versioned folders under the
//!    scripts root.
//! 2. Bootstrap: when a master connection is configured and the target
//!    database does not exist, the `00_CreateDB` scripts run outside of
//!    transactions, then the version table is seeded with version 0.
//! 3. Each versioned folder newer than the recorded version runs inside
//!    its own start/finish bracket on the version table, one transaction
//!    per script.
//!
//! Database calls are awaited one after another; a run never has two
//! statements in flight.

use crate::error::{MigrateError, MigrateResult};
use crate::outcome::{MigrationFailure, MigrationReport, MigrationStatus, PendingFolder};
use crate::resolver::{ConnectionResolver, TieredConnections};
use crate::version_store::{CurrentVersion, VersionStore};
use std::path::PathBuf;
use std::sync::Arc;
use sw_core::{
    discover, find_scripts, ConnectionTier, DiscoveredFolders, FolderKind, MigrationConfig,
    MigrationFolder, ScriptRef,
};
use sw_db::version_table::clear_updating_hint;
use sw_db::{driver_for, DatabaseCore, DbError, Driver, ScriptEncoding, ScriptOptions};

/// Applies a project's script folders to its database
pub struct Migrator {
    config: MigrationConfig,
    driver: Arc<dyn Driver>,
    connections: Box<dyn ConnectionResolver>,
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("project_name", &self.config.project_name)
            .field("engine", &self.config.engine)
            .finish_non_exhaustive()
    }
}

impl Migrator {
    /// Create a migrator using the driver for the configured engine
    pub fn new(config: MigrationConfig) -> MigrateResult<Self> {
        let driver = driver_for(config.engine).map_err(|e| match e {
            DbError::UnsupportedEngine(name) => MigrateError::UnsupportedEngine(name),
            other => MigrateError::Connection {
                tier: ConnectionTier::Ddl,
                source: other,
            },
        })?;
        Self::with_driver(config, driver)
    }

    /// Create a migrator over an explicit driver
    pub fn with_driver(config: MigrationConfig, driver: Arc<dyn Driver>) -> MigrateResult<Self> {
        config.validate()?;
        let connections = TieredConnections::new(
            config.connection_string_ddl.clone(),
            config.connection_string_master.clone(),
            driver.as_ref(),
        )?;
        Ok(Self {
            config,
            driver,
            connections: Box::new(connections),
        })
    }

    /// Replace how connection tiers are resolved
    pub fn with_resolver(mut self, resolver: Box<dyn ConnectionResolver>) -> Self {
        self.connections = resolver;
        self
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Configured scripts root, or the one found next to the executable
    pub fn scripts_root(&self) -> MigrateResult<PathBuf> {
        match &self.config.scripts_root {
            Some(root) => Ok(root.clone()),
            None => Ok(find_scripts(
                &self.config.project_name,
                self.config.engine,
            )?),
        }
    }

    /// Discover the folders to apply
    pub fn discover(&self) -> MigrateResult<DiscoveredFolders> {
        let root = self.scripts_root()?;
        log::debug!("Using scripts root '{}'", root.display());
        Ok(discover(&self.config.project_name, &root)?)
    }

    /// Bring the database up to the newest version folder.
    pub async fn run(&self) -> Result<MigrationReport, MigrationFailure> {
        let folders = self.discover()?;
        folders.log_summary();

        let mut report = MigrationReport::default();

        if let Some(bootstrap) = &folders.bootstrap {
            if self.connections.connection(ConnectionTier::Master).is_some() {
                if let Err(e) = self.process_bootstrap_folder(bootstrap, &mut report).await {
                    return Err(MigrationFailure::in_folder(
                        "createDB folder",
                        bootstrap,
                        e,
                        &folders.versioned,
                    ));
                }
            } else {
                log::info!(
                    "No master connection configured, skipping '{}'",
                    bootstrap
                );
            }
        }

        for (i, folder) in folders.versioned.iter().enumerate() {
            if let Err(e) = self.process_versioned_folder(folder, &mut report).await {
                return Err(MigrationFailure::in_folder(
                    "folder",
                    folder,
                    e,
                    &folders.versioned[i..],
                ));
            }
        }

        log::info!(
            "Project '{}' is up to date: {} folder(s) applied, {} script(s) executed",
            self.config.project_name,
            report.applied.len(),
            report.scripts_executed
        );
        Ok(report)
    }

    /// Whether the target database exists.
    ///
    /// The DDL connection is asked first, then the system connection. A
    /// failure on one candidate falls through to the next. When no candidate
    /// finds the database, the last candidate decides: its error is
    /// returned, otherwise `false`.
    pub async fn database_exists(&self) -> MigrateResult<bool> {
        let database = self
            .driver
            .database_name(&self.config.connection_string_ddl)
            .map_err(|source| MigrateError::Connection {
                tier: ConnectionTier::Ddl,
                source,
            })?;
        log::info!("Trying to connect to DB: '{}'", database);

        let mut last_outcome = None;
        for candidate in self.connections.probe_candidates() {
            match self
                .driver
                .database_exists(candidate.connection_string, &database)
                .await
            {
                Ok(true) => {
                    log::debug!("Database '{}' exists ({})", database, candidate.tier);
                    return Ok(true);
                }
                Ok(false) => {
                    log::debug!("Database '{}' not found ({})", database, candidate.tier);
                    last_outcome = Some(Ok(()));
                }
                Err(e) => {
                    log::info!(
                        "Checking database '{}' with the {} connection failed: {}",
                        database,
                        candidate.tier,
                        e
                    );
                    last_outcome = Some(Err(e));
                }
            }
        }

        match last_outcome {
            Some(Err(source)) => Err(MigrateError::DatabaseProbeFailure { database, source }),
            _ => Ok(false),
        }
    }

    /// Where the project stands, without changing anything
    pub async fn status(&self) -> MigrateResult<MigrationStatus> {
        let scripts_root = self.scripts_root()?;
        let folders = discover(&self.config.project_name, &scripts_root)?;
        let database_exists = self.database_exists().await?;

        let current = if database_exists {
            let store = self.version_store();
            if store.exists_version_table().await? {
                store.peek_current_version().await?
            } else {
                None
            }
        } else {
            None
        };

        let applied = current.map_or(CurrentVersion::NONE.version, |c| c.version);
        let pending = folders
            .versioned
            .iter()
            .filter_map(|folder| {
                let version = folder.version()?;
                (version > applied).then(|| PendingFolder {
                    version,
                    path: folder.path.clone(),
                    scripts: folder.scripts.len(),
                })
            })
            .collect();

        let master_configured = self.connections.connection(ConnectionTier::Master).is_some();
        Ok(MigrationStatus {
            project_name: self.config.project_name.clone(),
            engine: self.config.engine,
            scripts_root,
            database_exists,
            current_version: current.map(|c| c.version),
            updating: current.is_some_and(|c| c.updating),
            target_version: current.and_then(|c| c.target_version),
            bootstrap_pending: folders.bootstrap.is_some() && master_configured && !database_exists,
            pending,
            ignored: folders.ignored,
        })
    }

    fn version_store(&self) -> VersionStore<'_> {
        VersionStore::new(
            self.driver.as_ref(),
            &self.config.project_name,
            &self.config.connection_string_ddl,
        )
    }

    async fn process_bootstrap_folder(
        &self,
        folder: &MigrationFolder,
        report: &mut MigrationReport,
    ) -> MigrateResult<()> {
        let existed = self.database_exists().await?;
        if existed {
            log::info!("Database already exists, skipping '{}'", folder);
        } else {
            report.scripts_executed += self.execute_scripts(folder).await?;
            report.bootstrapped = true;
        }

        let store = self.version_store();
        let current = store.get_current_version().await?;
        if current.is_uninitialized() {
            store.seed(0).await?;
            report.current_version = Some(0);
            if existed {
                log::warn!(
                    "Version table initialized for an existing database. Drop the database \
                     first if the scripts in '{}' should run.",
                    folder
                );
            }
        } else {
            report.current_version = Some(current.version);
        }
        Ok(())
    }

    async fn process_versioned_folder(
        &self,
        folder: &MigrationFolder,
        report: &mut MigrationReport,
    ) -> MigrateResult<()> {
        let Some(version) = folder.version() else {
            return Ok(());
        };

        let store = self.version_store();
        let current = store.get_current_version().await?;
        if current.updating {
            return Err(MigrateError::BlockedByIncompleteUpdate {
                project: self.config.project_name.clone(),
                current: current.version,
                target: current.target_version,
                hint: clear_updating_hint(&self.config.project_name),
            });
        }
        report.current_version = Some(current.version);

        if version <= current.version {
            log::debug!(
                "Skipping folder '{}', version {} is already applied",
                folder,
                version
            );
            report.skipped.push(version);
            return Ok(());
        }

        store.start_updating(version).await?;
        match self.execute_scripts(folder).await {
            Ok(executed) => {
                store.finish_updating(version).await?;
                report.scripts_executed += executed;
                report.applied.push(version);
                report.current_version = Some(version);
                Ok(())
            }
            Err(e) => {
                if let Err(remove_err) = store.remove_version(version).await {
                    log::error!(
                        "Could not clear in-flight version {}: {}",
                        version,
                        remove_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Run every script of `folder` in order, stopping at the first failure
    async fn execute_scripts(&self, folder: &MigrationFolder) -> MigrateResult<usize> {
        log::info!("Execution of scripts from folder '{}'", folder);
        for (i, script) in folder.scripts.iter().enumerate() {
            let tier = script.tier(folder.kind);
            let connection_string =
                self.connections
                    .connection(tier)
                    .ok_or_else(|| MigrateError::MissingConnection {
                        tier,
                        script: script.path.clone(),
                    })?;

            self.execute_script(connection_string, script, folder.kind)
                .await
                .map_err(|source| MigrateError::ScriptExecutionFailure {
                    script: script.path.clone(),
                    remaining: folder.scripts[i..].iter().map(|s| s.path.clone()).collect(),
                    source,
                })?;
        }
        Ok(folder.scripts.len())
    }

    async fn execute_script(
        &self,
        connection_string: &str,
        script: &ScriptRef,
        kind: FolderKind,
    ) -> Result<(), DbError> {
        log::info!("Starting with execution of script: {}", script.path.display());
        let options = ScriptOptions {
            encoding: ScriptEncoding::detect_file(&script.path)?,
            timeout: self.config.script_timeout,
            in_transaction: matches!(kind, FolderKind::Versioned(_)),
        };
        self.driver
            .execute_file_script(connection_string, &script.path, &options)
            .await
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
