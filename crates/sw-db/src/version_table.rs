//! Version table contract shared by all SQL drivers.
//!
//! One row per project:
//!
//! | column           | meaning                                             |
//! |------------------|-----------------------------------------------------|
//! | `project_name`   | key                                                 |
//! | `version`        | last fully applied version, -1 until one completes  |
//! | `updating`       | a folder started but was not confirmed              |
//! | `target_version` | version being applied while `updating` is set       |
//!
//! Both DuckDB and Postgres accept the statements below verbatim, including
//! the `$n` placeholders.

/// Version table name
pub const VERSION_TABLE: &str = "stepwise_version";

/// Version stored in a row whose first folder has not completed
pub const NO_VERSION: i32 = -1;

pub(crate) const CREATE_VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS stepwise_version (
    project_name   VARCHAR(256) NOT NULL PRIMARY KEY,
    version        INTEGER NOT NULL,
    updating       BOOLEAN NOT NULL DEFAULT FALSE,
    target_version INTEGER,
    creation_date  TIMESTAMP NOT NULL DEFAULT now(),
    modified_date  TIMESTAMP
)";

pub(crate) const VERSION_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_name = 'stepwise_version'";

pub(crate) const SELECT_VERSION: &str =
    "SELECT version, updating, target_version FROM stepwise_version WHERE project_name = $1";

pub(crate) const START_UPDATING: &str = "INSERT INTO stepwise_version \
     (project_name, version, updating, target_version) VALUES ($1, -1, TRUE, $2) \
     ON CONFLICT (project_name) DO UPDATE SET updating = TRUE, \
     target_version = EXCLUDED.target_version, modified_date = now()";

pub(crate) const FINISH_UPDATING: &str = "UPDATE stepwise_version \
     SET version = $2, updating = FALSE, target_version = NULL, modified_date = now() \
     WHERE project_name = $1";

pub(crate) const DELETE_UNFINISHED: &str = "DELETE FROM stepwise_version \
     WHERE project_name = $1 AND version = -1 AND target_version = $2";

pub(crate) const CLEAR_IN_FLIGHT: &str = "UPDATE stepwise_version \
     SET updating = FALSE, target_version = NULL, modified_date = now() \
     WHERE project_name = $1 AND target_version = $2";

/// A project's row in the version table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Project name (key)
    pub project_name: String,

    /// Last fully applied version
    pub version: i32,

    /// In-flight marker
    pub updating: bool,

    /// Version being applied while `updating` is set
    pub target_version: Option<i32>,
}

/// SQL an operator runs to clear a stale in-flight marker
pub fn clear_updating_hint(project_name: &str) -> String {
    format!(
        "UPDATE {} SET updating = FALSE WHERE project_name = '{}'",
        VERSION_TABLE,
        project_name.replace('\'', "''")
    )
}
