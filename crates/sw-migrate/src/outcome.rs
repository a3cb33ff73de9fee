//! What a migration run reports back.

use crate::error::MigrateError;
use serde::Serialize;
use std::path::PathBuf;
use sw_core::{DbKind, MigrationFolder};

/// Summary of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// `00_CreateDB` scripts ran because the database did not exist
    pub bootstrapped: bool,

    /// Versions applied by this run, ascending
    pub applied: Vec<i32>,

    /// Versions found already applied
    pub skipped: Vec<i32>,

    /// Number of scripts executed
    pub scripts_executed: usize,

    /// Version recorded for the project at the end of the run
    pub current_version: Option<i32>,
}

/// A failed run, with the messages meant for operators
#[derive(Debug)]
pub struct MigrationFailure {
    /// Underlying error
    pub error: MigrateError,

    /// Error with context, its causes, and what is left to process
    pub message: String,

    /// Innermost cause only
    pub short_message: String,
}

impl MigrationFailure {
    /// Failure outside any folder
    pub fn new(error: MigrateError) -> Self {
        Self {
            message: error.detail(),
            short_message: error.root_cause(),
            error,
        }
    }

    /// Failure while processing `folder`; `pending` are the folders not
    /// completed, starting with the failed one when it is versioned.
    pub fn in_folder(
        label: &str,
        folder: &MigrationFolder,
        error: MigrateError,
        pending: &[MigrationFolder],
    ) -> Self {
        let mut message = format!(
            "Executing scripts from {} '{}' returned error: '{}'.",
            label,
            folder,
            error.detail()
        );
        if !pending.is_empty() {
            message.push_str("\nFollowing folders must still be processed:");
            for pending in pending {
                message.push('\n');
                message.push_str(&pending.to_string());
            }
        }
        Self {
            message,
            short_message: error.root_cause(),
            error,
        }
    }
}

impl std::fmt::Display for MigrationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MigrationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<MigrateError> for MigrationFailure {
    fn from(error: MigrateError) -> Self {
        Self::new(error)
    }
}

/// A versioned folder that a run would apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingFolder {
    pub version: i32,
    pub path: PathBuf,
    pub scripts: usize,
}

/// Read-only view of where a project stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub project_name: String,
    pub engine: DbKind,
    pub scripts_root: PathBuf,
    pub database_exists: bool,

    /// `None` when the database or the version table is missing, or the
    /// project has no row yet
    pub current_version: Option<i32>,

    /// In-flight marker left by an interrupted run
    pub updating: bool,
    pub target_version: Option<i32>,

    /// `00_CreateDB` would run on the next migrate
    pub bootstrap_pending: bool,
    pub pending: Vec<PendingFolder>,
    pub ignored: Vec<PathBuf>,
}

impl MigrationStatus {
    /// A run would do nothing
    pub fn is_up_to_date(&self) -> bool {
        !self.bootstrap_pending && self.pending.is_empty() && !self.updating
    }
}
