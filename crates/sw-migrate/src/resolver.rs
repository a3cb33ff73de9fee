//! Connection resolution per tier.

use crate::error::{MigrateError, MigrateResult};
use sw_core::ConnectionTier;
use sw_db::{DatabaseCore, Driver};

/// A connection to try when probing for the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub tier: ConnectionTier,
    pub connection_string: &'a str,
}

/// Maps connection tiers to connection strings.
pub trait ConnectionResolver: Send + Sync {
    /// Connection for `tier`, if configured
    fn connection(&self, tier: ConnectionTier) -> Option<&str>;

    /// Connections to ask, in order, whether the target database exists
    fn probe_candidates(&self) -> Vec<Candidate<'_>> {
        [ConnectionTier::Ddl, ConnectionTier::System]
            .into_iter()
            .filter_map(|tier| {
                self.connection(tier).map(|connection_string| Candidate {
                    tier,
                    connection_string,
                })
            })
            .collect()
    }
}

/// The three connections of a migration run.
///
/// The system connection is derived from the master connection by pointing
/// it at the engine's default database, so it only exists when a master
/// connection is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredConnections {
    ddl: String,
    master: Option<String>,
    system: Option<String>,
}

impl TieredConnections {
    /// Build the tiers, deriving the system connection through `driver`
    pub fn new(
        ddl: impl Into<String>,
        master: Option<String>,
        driver: &dyn Driver,
    ) -> MigrateResult<Self> {
        let master = master.filter(|m| !m.trim().is_empty());
        let system = master
            .as_deref()
            .map(|m| driver.with_default_database(m))
            .transpose()
            .map_err(|source| MigrateError::Connection {
                tier: ConnectionTier::Master,
                source,
            })?;

        Ok(Self {
            ddl: ddl.into(),
            master,
            system,
        })
    }
}

impl ConnectionResolver for TieredConnections {
    fn connection(&self, tier: ConnectionTier) -> Option<&str> {
        match tier {
            ConnectionTier::Ddl => Some(&self.ddl),
            ConnectionTier::Master => self.master.as_deref(),
            ConnectionTier::System => self.system.as_deref(),
        }
    }
}
