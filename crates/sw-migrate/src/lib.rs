//! sw-migrate - Migration engine for Stepwise
//!
//! Applies a project's `00_CreateDB` and versioned script folders to a
//! database, tracking progress in the version table so re-runs only apply
//! what is missing and interrupted updates are detected.

pub mod engine;
pub mod error;
pub mod outcome;
pub mod resolver;
pub mod version_store;

pub use engine::Migrator;
pub use error::{MigrateError, MigrateResult};
pub use outcome::{MigrationFailure, MigrationReport, MigrationStatus, PendingFolder};
pub use resolver::{Candidate, ConnectionResolver, TieredConnections};
pub use version_store::{CurrentVersion, VersionStore};
