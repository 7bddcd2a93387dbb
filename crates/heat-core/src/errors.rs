//! Cross-cutting error types.
//!
//! Storage-level errors (`DatabaseError`) live in `heat-db`; this enum covers
//! failures that can be detected before touching the database.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
