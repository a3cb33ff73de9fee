//! Version tracking for one project through the DDL connection.

use crate::error::{MigrateError, MigrateResult};
use serde::Serialize;
use sw_db::version_table::NO_VERSION;
use sw_db::{DbError, Driver, VersionRecord, VersionTable};

/// Applied version and in-flight state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentVersion {
    /// Last fully applied version, -1 when none
    pub version: i32,

    /// A previous update started and never finished
    pub updating: bool,

    /// Version that update was applying
    pub target_version: Option<i32>,
}

impl CurrentVersion {
    /// State of a project with no row
    pub const NONE: CurrentVersion = CurrentVersion {
        version: NO_VERSION,
        updating: false,
        target_version: None,
    };

    /// No version applied and nothing in flight
    pub fn is_uninitialized(&self) -> bool {
        self.version == NO_VERSION && !self.updating
    }
}

impl From<VersionRecord> for CurrentVersion {
    fn from(record: VersionRecord) -> Self {
        Self {
            version: record.version,
            updating: record.updating,
            target_version: record.target_version,
        }
    }
}

/// Reads and writes one project's row in the version table
pub struct VersionStore<'a> {
    driver: &'a dyn Driver,
    project_name: &'a str,
    connection_string: &'a str,
}

fn store_error(operation: &'static str) -> impl FnOnce(DbError) -> MigrateError {
    move |source| MigrateError::VersionStore { operation, source }
}

impl<'a> VersionStore<'a> {
    pub fn new(driver: &'a dyn Driver, project_name: &'a str, connection_string: &'a str) -> Self {
        Self {
            driver,
            project_name,
            connection_string,
        }
    }

    pub async fn exists_version_table(&self) -> MigrateResult<bool> {
        self.driver
            .version_table_exists(self.connection_string)
            .await
            .map_err(store_error("exists_version_table"))
    }

    pub async fn create_version_table(&self) -> MigrateResult<()> {
        log::info!("Creating version table");
        self.driver
            .create_version_table(self.connection_string)
            .await
            .map_err(store_error("create_version_table"))
    }

    /// Current version, creating the version table first when it is missing.
    ///
    /// A project without a row reports [`CurrentVersion::NONE`].
    pub async fn get_current_version(&self) -> MigrateResult<CurrentVersion> {
        if !self.exists_version_table().await? {
            self.create_version_table().await?;
        }
        Ok(self.peek_current_version().await?.unwrap_or(CurrentVersion::NONE))
    }

    /// Read the row without touching the schema
    pub async fn peek_current_version(&self) -> MigrateResult<Option<CurrentVersion>> {
        let record = self
            .driver
            .fetch_version(self.connection_string, self.project_name)
            .await
            .map_err(store_error("get_current_version"))?;
        Ok(record.map(CurrentVersion::from))
    }

    pub async fn start_updating(&self, version: i32) -> MigrateResult<()> {
        log::debug!(
            "Marking project '{}' as updating to version {}",
            self.project_name,
            version
        );
        self.driver
            .start_updating(self.connection_string, self.project_name, version)
            .await
            .map_err(store_error("start_updating"))
    }

    pub async fn finish_updating(&self, version: i32) -> MigrateResult<()> {
        log::debug!(
            "Project '{}' is now at version {}",
            self.project_name,
            version
        );
        self.driver
            .finish_updating(self.connection_string, self.project_name, version)
            .await
            .map_err(store_error("finish_updating"))
    }

    pub async fn remove_version(&self, version: i32) -> MigrateResult<()> {
        log::debug!(
            "Clearing in-flight version {} of project '{}'",
            version,
            self.project_name
        );
        self.driver
            .remove_version(self.connection_string, self.project_name, version)
            .await
            .map_err(store_error("remove_version"))
    }

    /// Record `version` as applied without running anything
    pub async fn seed(&self, version: i32) -> MigrateResult<()> {
        self.start_updating(version).await?;
        self.finish_updating(version).await
    }
}
