//! Driver trait definitions

use crate::encoding::ScriptEncoding;
use crate::error::DbResult;
use crate::version_table::VersionRecord;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use sw_core::DbKind;

/// How a script file is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Text encoding of the file
    pub encoding: ScriptEncoding,

    /// Upper bound for the whole script
    pub timeout: Duration,

    /// Wrap the script in a single transaction
    pub in_transaction: bool,
}

/// Connection handling and script execution.
///
/// Every call opens its own connection from the given connection string;
/// nothing is pooled between calls.
#[async_trait]
pub trait DatabaseCore: Send + Sync {
    /// Engine implemented by this driver
    fn db_type(&self) -> DbKind;

    /// Name of the database a connection string points at
    fn database_name(&self, connection_string: &str) -> DbResult<String>;

    /// Same credentials, pointed at the engine's always-present database
    fn with_default_database(&self, connection_string: &str) -> DbResult<String>;

    /// Check whether `database_name` exists, asking through `connection_string`
    async fn database_exists(&self, connection_string: &str, database_name: &str)
        -> DbResult<bool>;

    /// Execute every statement in a script file
    async fn execute_file_script(
        &self,
        connection_string: &str,
        path: &Path,
        options: &ScriptOptions,
    ) -> DbResult<()>;
}

/// Primitives behind the version table.
///
/// One row per project. See [`crate::version_table`] for the row contract.
#[async_trait]
pub trait VersionTable: Send + Sync {
    /// Check if the version table exists
    async fn version_table_exists(&self, connection_string: &str) -> DbResult<bool>;

    /// Create the version table if it does not exist
    async fn create_version_table(&self, connection_string: &str) -> DbResult<()>;

    /// Read the project's row
    async fn fetch_version(
        &self,
        connection_string: &str,
        project_name: &str,
    ) -> DbResult<Option<VersionRecord>>;

    /// Insert or update the project's row with `updating = true`
    async fn start_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()>;

    /// Record `version` as applied and clear the in-flight marker
    async fn finish_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()>;

    /// Clear the in-flight marker for `version` without applying it
    async fn remove_version(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()>;
}

/// Everything the migration engine needs from a database engine.
pub trait Driver: DatabaseCore + VersionTable {}

impl<T: DatabaseCore + VersionTable + ?Sized> Driver for T {}
