//! Postgres driver

use crate::connection_string::replace_database;
use crate::encoding::read_script;
use crate::error::{DbError, DbResult};
use crate::traits::{DatabaseCore, ScriptOptions, VersionTable};
use crate::version_table::{
    VersionRecord, CLEAR_IN_FLIGHT, CREATE_VERSION_TABLE, DELETE_UNFINISHED, FINISH_UPDATING,
    SELECT_VERSION, START_UPDATING, VERSION_TABLE_EXISTS,
};
use async_trait::async_trait;
use std::path::Path;
use sw_core::DbKind;
use tokio_postgres::{Client, Config, NoTls};

/// Database every Postgres cluster has
const DEFAULT_DATABASE: &str = "postgres";

/// Postgres driver over `tokio-postgres` without TLS
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new Postgres driver
    pub fn new() -> Self {
        Self
    }

    /// Open a connection and drive it on the runtime until the client drops
    async fn connect(connection_string: &str) -> DbResult<Client> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::warn!("Postgres connection error: {}", e);
            }
        });

        Ok(client)
    }

    fn parse_config(connection_string: &str) -> DbResult<Config> {
        connection_string
            .parse::<Config>()
            .map_err(|e| DbError::InvalidConnectionString(e.to_string()))
    }
}

#[async_trait]
impl DatabaseCore for PostgresDriver {
    fn db_type(&self) -> DbKind {
        DbKind::Postgres
    }

    fn database_name(&self, connection_string: &str) -> DbResult<String> {
        let config = Self::parse_config(connection_string)?;
        // libpq connects to the database named like the user when none is given
        config
            .get_dbname()
            .or(config.get_user())
            .map(str::to_string)
            .ok_or_else(|| {
                DbError::InvalidConnectionString(
                    "connection string names neither a database nor a user".to_string(),
                )
            })
    }

    fn with_default_database(&self, connection_string: &str) -> DbResult<String> {
        Self::parse_config(connection_string)?;
        replace_database(connection_string, DEFAULT_DATABASE)
    }

    async fn database_exists(
        &self,
        connection_string: &str,
        database_name: &str,
    ) -> DbResult<bool> {
        let client = Self::connect(connection_string).await?;
        let row = client
            .query_opt(
                "SELECT 1 FROM pg_database WHERE datname = $1",
                &[&database_name],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn execute_file_script(
        &self,
        connection_string: &str,
        path: &Path,
        options: &ScriptOptions,
    ) -> DbResult<()> {
        let sql = read_script(path, options.encoding)?;
        let mut client = Self::connect(connection_string).await?;

        let run = async {
            if options.in_transaction {
                let tx = client.transaction().await?;
                tx.batch_execute(&sql).await?;
                tx.commit().await
            } else {
                client.batch_execute(&sql).await
            }
        };

        match tokio::time::timeout(options.timeout, run).await {
            Ok(result) => result.map_err(DbError::from),
            Err(_) => Err(DbError::Timeout {
                path: path.display().to_string(),
                seconds: options.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl VersionTable for PostgresDriver {
    async fn version_table_exists(&self, connection_string: &str) -> DbResult<bool> {
        let client = Self::connect(connection_string).await?;
        let count: i64 = client.query_one(VERSION_TABLE_EXISTS, &[]).await?.get(0);
        Ok(count > 0)
    }

    async fn create_version_table(&self, connection_string: &str) -> DbResult<()> {
        let client = Self::connect(connection_string).await?;
        client.batch_execute(CREATE_VERSION_TABLE).await?;
        Ok(())
    }

    async fn fetch_version(
        &self,
        connection_string: &str,
        project_name: &str,
    ) -> DbResult<Option<VersionRecord>> {
        let client = Self::connect(connection_string).await?;
        let row = client.query_opt(SELECT_VERSION, &[&project_name]).await?;
        Ok(row.map(|row| VersionRecord {
            project_name: project_name.to_string(),
            version: row.get(0),
            updating: row.get(1),
            target_version: row.get(2),
        }))
    }

    async fn start_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let client = Self::connect(connection_string).await?;
        client
            .execute(START_UPDATING, &[&project_name, &version])
            .await?;
        Ok(())
    }

    async fn finish_updating(
        &self,
        connection_string: &str,
        project_name: &str,
        version: i32,
    ) -> DbResult<()> {
        let client = Self::connect(connection_string).await?;
        let updated = client
            .execute(FINISH_UPDATING, &[&project_name, &version])
            .await?;
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
        let client = Self::connect(connection_string).await?;
        client
            .execute(DELETE_UNFINISHED, &[&project_name, &version])
            .await?;
        client
            .execute(CLEAR_IN_FLIGHT, &[&project_name, &version])
            .await?;
        Ok(())
    }
}
