//! In-memory driver for engine tests.
//!
//! Simulates one target database behind Postgres-like rules: connecting to
//! a database that does not exist fails, and the engine's default database
//! (`postgres`) is always reachable. Connection strings take the form
//! `<credentials>@<database>`, e.g. `ddl@app` or `master@postgres`.
//!
//! Scripts are never read; executing one only records it. A successful
//! non-transactional script (the bootstrap kind) creates the target
//! database.

use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, ScriptOptions, VersionTable};
use crate::version_table::{VersionRecord, NO_VERSION};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use sw_core::DbKind;

const DEFAULT_DATABASE: &str = "postgres";

/// A script execution seen by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedScript {
    /// Base file name
    pub file_name: String,
    /// Connection string it ran against
    pub connection_string: String,
    /// Whether it ran inside a transaction
    pub in_transaction: bool,
}

#[derive(Debug, Default)]
struct State {
    database_created: bool,
    version_table: Option<HashMap<String, VersionRecord>>,
    executed: Vec<ExecutedScript>,
    events: Vec<String>,
    failing_scripts: HashSet<String>,
    unreachable: HashSet<String>,
}

/// Scriptable stand-in for a real database
#[derive(Debug)]
pub struct InMemoryDriver {
    target: String,
    state: Mutex<State>,
}

impl Default for InMemoryDriver {
    fn default() -> Self {
        Self::new("app")
    }
}

impl InMemoryDriver {
    /// Driver whose target database `target` does not exist yet
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    /// Mark the target database as existing
    pub fn with_existing_database(self) -> Self {
        self.lock().database_created = true;
        self
    }

    /// Create the version table with the given row already in it
    pub fn with_version_row(self, project_name: &str, version: i32, updating: bool) -> Self {
        {
            let mut state = self.lock();
            state.database_created = true;
            state.version_table.get_or_insert_with(HashMap::new).insert(
                project_name.to_string(),
                VersionRecord {
                    project_name: project_name.to_string(),
                    version,
                    updating,
                    target_version: updating.then_some(version + 1),
                },
            );
        }
        self
    }

    /// Make every execution of the script named `file_name` fail
    pub fn fail_script(self, file_name: &str) -> Self {
        self.lock().failing_scripts.insert(file_name.to_string());
        self
    }

    /// Make every call through `connection_string` fail to connect
    pub fn unreachable(self, connection_string: &str) -> Self {
        self.lock().unreachable.insert(connection_string.to_string());
        self
    }

    /// Scripts executed so far, in order
    pub fn executed(&self) -> Vec<ExecutedScript> {
        self.lock().executed.clone()
    }

    /// File names of the scripts executed so far, in order
    pub fn executed_names(&self) -> Vec<String> {
        self.lock()
            .executed
            .iter()
            .map(|s| s.file_name.clone())
            .collect()
    }

    /// Version-table calls and script runs, in order
    pub fn events(&self) -> Vec<String> {
        self.lock().events.clone()
    }

    /// Current row for a project
    pub fn version_row(&self, project_name: &str) -> Option<VersionRecord> {
        self.lock()
            .version_table
            .as_ref()
            .and_then(|t| t.get(project_name).cloned())
    }

    /// Whether the version table exists
    pub fn has_version_table(&self) -> bool {
        self.lock().version_table.is_some()
    }

    /// Whether the target database exists
    pub fn database_created(&self) -> bool {
        self.lock().database_created
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn split(connection_string: &str) -> DbResult<(&str, &str)> {
        connection_string.split_once('@').ok_or_else(|| {
            DbError::InvalidConnectionString(format!(
                "expected <credentials>@<database>, got '{}'",
                connection_string
            ))
        })
    }

    /// Simulate opening a connection
    fn connect(&self, state: &State, connection_string: &str) -> DbResult<()> {
        if state.unreachable.contains(connection_string) {
            return Err(DbError::ConnectionError(format!(
                "could not connect with '{}'",
                connection_string
            )));
        }
        let (_, database) = Self::split(connection_string)?;
        if database == DEFAULT_DATABASE || (database == self.target && state.database_created) {
            Ok(())
        } else {
            Err(DbError::ConnectionError(format!(
                "database \"{}\" does not exist",
                database
            )))
        }
    }

    /// Connect and require the version table
    fn table<'s>(
        &self,
        state: &'s mut MutexGuard<'_, State>,
        connection_string: &str,
    ) -> DbResult<&'s mut HashMap<String, VersionRecord>> {
        self.connect(state, connection_string)?;
        state.version_table.as_mut().ok_or_else(|| {
            DbError::ExecutionError("relation \"stepwise_version\" does not exist".to_string())
        })
    }
}

#[async_trait]
impl DatabaseCore for InMemoryDriver {
    fn db_type(&self) -> DbKind {
        DbKind::Postgres
    }

    fn database_name(&self, connection_string: &str) -> DbResult<String> {
        Ok(Self::split(connection_string)?.1.to_string())
    }

    fn with_default_database(&self, connection_string: &str) -> DbResult<String> {
        let (credentials, _) = Self::split(connection_string)?;
        Ok(format!("{}@{}", credentials, DEFAULT_DATABASE))
    }

    async fn database_exists(
        &self,
        connection_string: &str,
        database_name: &str,
    ) -> DbResult<bool> {
        let state = self.lock();
        self.connect(&state, connection_string)?;
        Ok(database_name == DEFAULT_DATABASE
            || (database_name == self.target && state.database_created))
    }

    async fn execute_file_script(
        &self,
        connection_string: &str,
        path: &Path,
        options: &ScriptOptions,
    ) -> DbResult<()> {
        let mut state = self.lock();
        self.connect(&state, connection_string)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        state.events.push(format!("script {}", file_name));
        if state.failing_scripts.contains(&file_name) {
            return Err(DbError::ExecutionError(format!(
                "syntax error in {}",
                file_name
            )));
        }

        state.executed.push(ExecutedScript {
            file_name,
            connection_string: connection_string.to_string(),
            in_transaction: options.in_transaction,
        });
        if !options.in_transaction {
            state.database_created = true;
        }
        Ok(())
    }
}

#[async_trait]
impl VersionTable for InMemoryDriver {
    async fn version_table_exists(&self, connection_string: &str) -> DbResult<bool> {
        let state = self.lock();
        self.connect(&state, connection_string)?;
        Ok(state.version_table.is_some())
    }

    async fn create_version_table(&self, connection_string: &str) -> DbResult<()> {
        let mut state = self.lock();
        self.connect(&state, connection_string)?;
        state.events.push("create table".to_string());
        state.version_table.get_or_insert_with(HashMap::new);
        Ok(())
    }

    async fn fetch_version(
        &self,
        connection_string: &str,
        project_name: &str,
    ) -> DbResult<Option<VersionRecord>> {
        let mut state = self.lock();
        let table = self.table(&mut state, connection_string)?;
        Ok(table.get(project_name).cloned())
    }

    async fn start_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let mut state = self.lock();
        let table = self.table(&mut state, connection_string)?;
        let row = table
            .entry(project_name.to_string())
            .or_insert_with(|| VersionRecord {
                project_name: project_name.to_string(),
                version: NO_VERSION,
                updating: false,
                target_version: None,
            });
        row.updating = true;
        row.target_version = Some(version);
        state.events.push(format!("start {}", version));
        Ok(())
    }

    async fn finish_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let mut state = self.lock();
        let table = self.table(&mut state, connection_string)?;
        let row = table.get_mut(project_name).ok_or_else(|| {
            DbError::ExecutionError(format!("no version row for project '{}'", project_name))
        })?;
        row.version = version;
        row.updating = false;
        row.target_version = None;
        state.events.push(format!("finish {}", version));
        Ok(())
    }

    async fn remove_version(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let mut state = self.lock();
        let table = self.table(&mut state, connection_string)?;
        let unfinished = table
            .get(project_name)
            .is_some_and(|r| r.version == NO_VERSION && r.target_version == Some(version));
        if unfinished {
            table.remove(project_name);
        } else if let Some(row) = table
            .get_mut(project_name)
            .filter(|r| r.target_version == Some(version))
        {
            row.updating = false;
            row.target_version = None;
        }
        state.events.push(format!("remove {}", version));
        Ok(())
    }
}
