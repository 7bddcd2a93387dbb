//! Service layer hosting every scheduling operation.
//!
//! `HeatService` wraps `HeatDb` (raw database access) and the scheduler
//! configuration. All repo methods are implemented as `impl HeatService`
//! blocks in [`crate::repos`].

use heat_config::{HeatConfig, SchedulerConfig};

use crate::HeatDb;
use crate::error::DatabaseError;

/// Runs scheduling operations against one database.
///
/// Every mutation method follows this protocol:
/// 1. Begin an `IMMEDIATE` transaction
/// 2. Read the rows the operation plans from
/// 3. Write through the lane allocator / synchronizer primitives
/// 4. Commit, or roll back on the first error
pub struct HeatService {
    db: HeatDb,
    scheduler: SchedulerConfig,
}

impl HeatService {
    /// Create a service over a local database with default scheduler settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = HeatDb::open_local(db_path).await?;
        Ok(Self::from_db(db, SchedulerConfig::default()))
    }

    /// Create a service from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the scheduler settings are invalid or the
    /// database cannot be opened.
    pub async fn from_config(config: &HeatConfig) -> Result<Self, DatabaseError> {
        config.scheduler.validate()?;
        let db = HeatDb::open_local(&config.database.path).await?;
        Ok(Self::from_db(db, config.scheduler.clone()))
    }

    /// Create from an existing `HeatDb`.
    #[must_use]
    pub const fn from_db(db: HeatDb, scheduler: SchedulerConfig) -> Self {
        Self { db, scheduler }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &HeatDb {
        &self.db
    }

    #[must_use]
    pub const fn scheduler(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    /// Change scheduler settings at runtime (e.g., toggle capacity enforcement).
    pub fn set_scheduler(&mut self, scheduler: SchedulerConfig) {
        self.scheduler = scheduler;
    }
}
