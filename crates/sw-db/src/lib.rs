//! sw-db - Database drivers for Stepwise
//!
//! This crate provides the `Driver` capability the migration engine runs
//! against, with DuckDB and Postgres implementations and the shared SQL of
//! the version table.

pub mod connection_string;
pub mod duckdb;
pub mod encoding;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;
pub mod traits;
pub mod version_table;

use std::sync::Arc;
use sw_core::DbKind;

pub use crate::duckdb::DuckDbDriver;
pub use encoding::ScriptEncoding;
pub use error::{DbError, DbResult};
pub use crate::postgres::PostgresDriver;
pub use traits::{DatabaseCore, Driver, ScriptOptions, VersionTable};
pub use version_table::VersionRecord;

/// Driver for an engine tag.
///
/// Fails with [`DbError::UnsupportedEngine`] for engines that are recognized
/// but have no implementation.
pub fn driver_for(kind: DbKind) -> DbResult<Arc<dyn Driver>> {
    match kind {
        DbKind::Postgres => Ok(Arc::new(PostgresDriver::new())),
        DbKind::DuckDb => Ok(Arc::new(DuckDbDriver::new())),
        DbKind::SqlServer => Err(DbError::UnsupportedEngine(kind.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_for_supported_engines() {
        assert_eq!(driver_for(DbKind::Postgres).unwrap().db_type(), DbKind::Postgres);
        assert_eq!(driver_for(DbKind::DuckDb).unwrap().db_type(), DbKind::DuckDb);
    }

    #[test]
    fn test_driver_for_unsupported_engine() {
        assert!(matches!(
            driver_for(DbKind::SqlServer),
            Err(DbError::UnsupportedEngine(_))
        ));
    }
}
