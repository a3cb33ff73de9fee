//! Error types for sw-db

use thiserror::Error;

/// Database driver errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Connection string could not be parsed or rewritten (D003)
    #[error("[D003] Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Script file could not be read (D004)
    #[error("[D004] Failed to read script '{path}': {source}")]
    ScriptRead {
        path: String,
        source: std::io::Error,
    },

    /// Script file is not valid text in its encoding (D005)
    #[error("[D005] Script '{path}' is not valid {encoding} text")]
    ScriptDecode { path: String, encoding: String },

    /// Script exceeded its timeout (D006)
    #[error("[D006] Script '{path}' did not finish within {seconds}s")]
    Timeout { path: String, seconds: u64 },

    /// Engine has no driver (D007)
    #[error("[D007] No driver available for database engine '{0}'")]
    UnsupportedEngine(String),

    /// Postgres driver error with preserved source chain (D008)
    #[error("[D008] Postgres error: {0}")]
    Postgres(#[source] tokio_postgres::Error),

    /// DuckDB driver error with preserved source chain (D009)
    #[error("[D009] DuckDB error: {0}")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<tokio_postgres::Error> for DbError {
    fn from(err: tokio_postgres::Error) -> Self {
        DbError::Postgres(err)
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}
