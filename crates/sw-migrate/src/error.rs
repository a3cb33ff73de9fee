//! Error types for sw-migrate

use std::error::Error as _;
use std::path::PathBuf;
use sw_core::{ConnectionTier, CoreError};
use sw_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration, lookup or discovery failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Existence of the target database could not be determined (M001)
    #[error("[M001] Could not determine whether database '{database}' exists")]
    DatabaseProbeFailure {
        database: String,
        #[source]
        source: DbError,
    },

    /// A script failed; `remaining` lists it and every script after it (M002)
    #[error("[M002] Executing script '{}' returned error", .script.display())]
    ScriptExecutionFailure {
        script: PathBuf,
        remaining: Vec<PathBuf>,
        #[source]
        source: DbError,
    },

    /// A previous run left the in-flight marker set (M003)
    #[error(
        "[M003] Update of project '{project}' {} did not complete. Before another update of the \
         database clear the updating flag with: {hint} or delete the row to retry the folder",
        describe_target(.current, .target)
    )]
    BlockedByIncompleteUpdate {
        project: String,
        current: i32,
        target: Option<i32>,
        hint: String,
    },

    /// Engine is recognized but has no driver (M004)
    #[error("[M004] Database engine '{0}' is not supported")]
    UnsupportedEngine(String),

    /// A script needs a connection that is not configured (M005)
    #[error(
        "[M005] Script '{}' needs the {tier} connection, which is not configured",
        .script.display()
    )]
    MissingConnection {
        tier: ConnectionTier,
        script: PathBuf,
    },

    /// A version table operation failed (M006)
    #[error("[M006] Version table operation '{operation}' failed")]
    VersionStore {
        operation: &'static str,
        #[source]
        source: DbError,
    },

    /// A configured connection string is unusable (M007)
    #[error("[M007] Invalid {tier} connection string")]
    Connection {
        tier: ConnectionTier,
        #[source]
        source: DbError,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

fn describe_target(current: &i32, target: &Option<i32>) -> String {
    match target {
        Some(target) => format!("from version {} to {}", current, target),
        None => format!("past version {}", current),
    }
}

impl MigrateError {
    /// This error followed by each distinct cause, joined with `: `.
    ///
    /// A cause whose text is already part of the message is not repeated.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }

    /// Text of the innermost cause.
    ///
    /// The walk stops at a driver error, whose message already carries the
    /// database's own diagnostic.
    pub fn root_cause(&self) -> String {
        let mut current: &(dyn std::error::Error + 'static) = self;
        while let Some(cause) = current.source() {
            if current.downcast_ref::<DbError>().is_some() {
                break;
            }
            current = cause;
        }
        current.to_string()
    }

    /// Full chain, plus the scripts left unexecuted for a script failure
    pub fn detail(&self) -> String {
        let mut message = self.chain();
        if let MigrateError::ScriptExecutionFailure { remaining, .. } = self {
            if !remaining.is_empty() {
                message.push_str("\nFollowing files must still be processed:");
                for path in remaining {
                    message.push('\n');
                    message.push_str(&path.display().to_string());
                }
            }
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_failure() -> MigrateError {
        MigrateError::ScriptExecutionFailure {
            script: PathBuf::from("02/02_b.sql"),
            remaining: vec![PathBuf::from("02/02_b.sql"), PathBuf::from("02/03_c.sql")],
            source: DbError::ExecutionError("relation \"x\" does not exist".to_string()),
        }
    }

    #[test]
    fn test_chain_includes_cause() {
        assert_eq!(
            script_failure().chain(),
            "[M002] Executing script '02/02_b.sql' returned error: \
             [D002] SQL execution failed: relation \"x\" does not exist"
        );
    }

    #[test]
    fn test_chain_skips_repeated_cause() {
        let err = MigrateError::VersionStore {
            operation: "start_updating",
            source: DbError::ScriptRead {
                path: "a.sql".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            },
        };

        assert_eq!(
            err.chain(),
            "[M006] Version table operation 'start_updating' failed: \
             [D004] Failed to read script 'a.sql': gone"
        );
    }

    #[test]
    fn test_root_cause_stops_at_driver_error() {
        assert_eq!(
            script_failure().root_cause(),
            "[D002] SQL execution failed: relation \"x\" does not exist"
        );
    }

    #[test]
    fn test_root_cause_without_source() {
        let err = MigrateError::UnsupportedEngine("SqlServer".to_string());
        assert_eq!(err.root_cause(), err.to_string());
    }

    #[test]
    fn test_detail_lists_remaining_scripts() {
        let detail = script_failure().detail();
        assert!(detail.ends_with(
            "\nFollowing files must still be processed:\n02/02_b.sql\n02/03_c.sql"
        ));
    }

    #[test]
    fn test_blocked_message_names_target() {
        let err = MigrateError::BlockedByIncompleteUpdate {
            project: "app".to_string(),
            current: 3,
            target: Some(4),
            hint: "UPDATE x".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("from version 3 to 4"));
        assert!(message.contains("UPDATE x"));
    }
}
