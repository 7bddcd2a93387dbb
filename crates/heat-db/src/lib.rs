//! # heat-db
//!
//! libSQL storage and the heat/lane scheduling engine.
//!
//! Holds the relational schedule state (competitions, workouts, heats, lanes,
//! entries, ticket types) and every operation that mutates it. Each public
//! mutation runs inside one `IMMEDIATE` transaction: it either commits
//! completely or rolls back and leaves every workout untouched.
//!
//! Engine components live in [`repos`]:
//! - [`repos::entry`]: entry registry (which entries exist, who is placed)
//! - [`repos::index`]: heat index resolver (ordinal rank, linked heats)
//! - [`repos::lane`]: lane allocator (contiguous numbering, reorder)
//! - [`repos::sync`]: cross-workout synchronizer (moves, placements)
//! - [`repos::heat`]: heat lifecycle (create, capacity, paired delete)
//! - [`repos::workout`]: workout teardown

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::{Builder, Transaction, TransactionBehavior};

/// Central database handle.
///
/// Wraps a libSQL database and its single connection.
pub struct HeatDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl HeatDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let heat_db = Self { db, conn };
        heat_db.run_migrations().await?;
        Ok(heat_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID, e.g. `"hea-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        helpers::generate_id(&self.conn, prefix).await
    }

    /// Begin a write transaction.
    ///
    /// `IMMEDIATE` takes the write lock up front, so the reads that plan a
    /// renumbering cannot go stale before the writes land.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the lock cannot be acquired.
    pub async fn begin(&self) -> Result<Transaction, DatabaseError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?)
    }

    /// Commit on `Ok`, roll back on `Err`, and hand the result back.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or the commit error.
    pub async fn finish<T>(
        tx: Transaction,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(%rollback, %error, "rollback failed after error");
                }
                Err(error)
            }
        }
    }
}
