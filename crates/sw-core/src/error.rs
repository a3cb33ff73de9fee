//! Error types for sw-core

use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// S001: Configuration file not found
    #[error("[S001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// S002: Invalid configuration value
    #[error("[S002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// S003: No `<project>.Database` folder near the start location
    #[error("[S003] Can not find folder '{folder}' near location {start}")]
    ScriptsRootNotFound { folder: String, start: String },

    /// S004: Project folder found but the engine scripts folder is absent
    #[error("[S004] Folder {path} with custom scripts does not exist")]
    ScriptsRootMissing { path: String },

    /// S005: Scripts root handed to discovery does not exist
    #[error("[S005] Folder {path} with scripts does not exist")]
    ScriptsFolderMissing { path: String },

    /// S006: Engine tag has no driver implementation
    #[error("[S006] Database engine '{name}' is not supported")]
    UnsupportedEngine { name: String },

    /// S007: IO error with file path context
    #[error("[S007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// S008: IO error
    #[error("[S008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// S009: YAML parse error
    #[error("[S009] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn io_with_path(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}
