//! sw-core - Core library for Stepwise
//!
//! This crate provides configuration parsing, scripts-root lookup, folder
//! discovery and script classification shared by the migration engine and
//! the CLI. Nothing in here talks to a database.

pub mod config;
pub mod error;
pub mod folders;
pub mod ordering;
pub mod paths;
pub mod script;

pub use config::{DbKind, MigrationConfig};
pub use error::{CoreError, CoreResult};
pub use folders::{discover, DiscoveredFolders, FolderKind, MigrationFolder};
pub use paths::{find_scripts, find_scripts_from};
pub use script::{list_scripts, ConnectionTier, ScriptMarker, ScriptRef};
