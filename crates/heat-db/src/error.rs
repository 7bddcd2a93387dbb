//! Database error types for heat-db.

use heat_core::enums::EntityKind;
use heat_core::errors::CoreError;
use thiserror::Error;

/// Errors from storage and scheduling operations.
///
/// Every error aborts the enclosing transaction; nothing is retried here.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The operation is blocked by existing data (occupied heats, missing
    /// ticket type, duplicate placement, full heat).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data does not allow the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller input is out of range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: EntityKind, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Other(e) => Self::Other(e),
        }
    }
}

impl From<heat_config::ConfigError> for DatabaseError {
    fn from(error: heat_config::ConfigError) -> Self {
        Self::Other(error.into())
    }
}
