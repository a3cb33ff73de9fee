//! DuckDB driver
//!
//! A DuckDB "connection string" is the path of the database file. The
//! always-present default database is an in-memory one, and a database
//! exists when its file does.

use crate::encoding::read_script;
use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, ScriptOptions, VersionTable};
use crate::version_table::{
    VersionRecord, CLEAR_IN_FLIGHT, CREATE_VERSION_TABLE, DELETE_UNFINISHED, FINISH_UPDATING,
    SELECT_VERSION, START_UPDATING, VERSION_TABLE_EXISTS,
};
use async_trait::async_trait;
use duckdb::{Connection, OptionalExt};
use std::path::Path;
use sw_core::DbKind;

const MEMORY: &str = ":memory:";

/// DuckDB driver
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbDriver;

impl DuckDbDriver {
    /// Create a new DuckDB driver
    pub fn new() -> Self {
        Self
    }

    /// Open a connection (handles :memory: special case)
    fn open(connection_string: &str) -> DbResult<Connection> {
        let target = connection_string.trim();
        let conn = if target == MEMORY {
            Connection::open_in_memory()
        } else {
            Connection::open(Path::new(target))
        };
        conn.map_err(|e| DbError::ConnectionError(format!("{}: {}", e, target)))
    }

    /// Execute `sql` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    fn execute_in_transaction(conn: &Connection, sql: &str) -> DbResult<()> {
        conn.execute_batch("BEGIN TRANSACTION")?;

        if let Err(e) = conn.execute_batch(sql) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(e.into());
        }

        if let Err(commit_err) = conn.execute_batch("COMMIT") {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(commit_err.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseCore for DuckDbDriver {
    fn db_type(&self) -> DbKind {
        DbKind::DuckDb
    }

    fn database_name(&self, connection_string: &str) -> DbResult<String> {
        let target = connection_string.trim();
        if target.is_empty() {
            return Err(DbError::InvalidConnectionString(
                "DuckDB connection string must be a database file path".to_string(),
            ));
        }
        Ok(target.to_string())
    }

    fn with_default_database(&self, _connection_string: &str) -> DbResult<String> {
        Ok(MEMORY.to_string())
    }

    /// Only the file system is consulted; `connection_string` is not opened,
    /// since opening a DuckDB file creates it.
    async fn database_exists(
        &self,
        _connection_string: &str,
        database_name: &str,
    ) -> DbResult<bool> {
        Ok(database_name == MEMORY || Path::new(database_name).is_file())
    }

    /// `options.timeout` is not enforced: DuckDB runs in-process and the call
    /// blocks until the script completes.
    async fn execute_file_script(
        &self,
        connection_string: &str,
        path: &Path,
        options: &ScriptOptions,
    ) -> DbResult<()> {
        let sql = read_script(path, options.encoding)?;
        let conn = Self::open(connection_string)?;
        if options.in_transaction {
            Self::execute_in_transaction(&conn, &sql)
        } else {
            conn.execute_batch(&sql).map_err(DbError::from)
        }
    }
}

#[async_trait]
impl VersionTable for DuckDbDriver {
    async fn version_table_exists(&self, connection_string: &str) -> DbResult<bool> {
        let conn = Self::open(connection_string)?;
        let count: i64 = conn.query_row(VERSION_TABLE_EXISTS, [], |row| row.get(0))?;
        Ok(count > 0)
    }

    async fn create_version_table(&self, connection_string: &str) -> DbResult<()> {
        let conn = Self::open(connection_string)?;
        conn.execute_batch(CREATE_VERSION_TABLE)?;
        Ok(())
    }

    async fn fetch_version(
        &self,
        connection_string: &str,
        project_name: &str,
    ) -> DbResult<Option<VersionRecord>> {
        let conn = Self::open(connection_string)?;
        let record = conn
            .query_row(SELECT_VERSION, duckdb::params![project_name], |row| {
                Ok(VersionRecord {
                    project_name: project_name.to_string(),
                    version: row.get(0)?,
                    updating: row.get(1)?,
                    target_version: row.get(2)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    async fn start_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let conn = Self::open(connection_string)?;
        conn.execute(START_UPDATING, duckdb::params![project_name, version])?;
        Ok(())
    }

    async fn finish_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let conn = Self::open(connection_string)?;
        let updated = conn.execute(FINISH_UPDATING, duckdb::params![project_name, version])?;
        if updated == 0 {
            return Err(DbError::ExecutionError(format!(
                "no version row for project '{}'",
                project_name
            )));
        }
        Ok(())
    }

    async fn remove_version(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let conn = Self::open(connection_string)?;
        conn.execute(DELETE_UNFINISHED, duckdb::params![project_name, version])?;
        conn.execute(CLEAR_IN_FLIGHT, duckdb::params![project_name, version])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
