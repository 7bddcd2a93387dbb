//! Heat index resolver.
//!
//! A heat's index is its zero-based rank among its workout's heats ordered by
//! `(start_time, sequence, id)`. Heats sharing an index across the workouts of
//! one competition are linked and form one round.

use heat_core::entities::Heat;
use heat_core::enums::EntityKind;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, query_all, query_count, query_opt, to_sql_int};
use crate::repos::heat::{HEAT_COLS, fetch_heat, row_to_heat};
use crate::service::HeatService;

/// A heat together with every heat linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedHeats {
    pub competition_id: String,
    pub index: usize,
    /// One heat per workout that has a heat at `index`, in workout order.
    /// Includes the heat the set was resolved from.
    pub heats: Vec<Heat>,
}

impl LinkedHeats {
    /// The linked heat in the given workout, if that workout has one.
    #[must_use]
    pub fn in_workout(&self, workout_id: &str) -> Option<&Heat> {
        self.heats.iter().find(|h| h.workout_id == workout_id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.heats.iter().map(|h| h.id.as_str()).collect()
    }
}

pub(crate) async fn competition_of_workout(
    conn: &libsql::Connection,
    workout_id: &str,
) -> Result<String, DatabaseError> {
    query_opt(
        conn,
        "SELECT competition_id FROM workouts WHERE id = ?1",
        [workout_id],
        |row| Ok(row.get::<String>(0)?),
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Workout, workout_id))
}

/// Rank of an already-fetched heat within its workout.
pub(crate) async fn rank_of(conn: &libsql::Connection, heat: &Heat) -> Result<usize, DatabaseError> {
    let before = query_count(
        conn,
        "SELECT COUNT(*) FROM heats
         WHERE workout_id = ?1
           AND (start_time < ?2
                OR (start_time = ?2 AND (sequence < ?3 OR (sequence = ?3 AND id < ?4))))",
        libsql::params![
            heat.workout_id.as_str(),
            format_datetime(&heat.start_time),
            heat.sequence,
            heat.id.as_str()
        ],
    )
    .await?;
    usize::try_from(before)
        .map_err(|_| DatabaseError::InvalidState(format!("negative rank for heat {}", heat.id)))
}

pub(crate) async fn index_of(conn: &libsql::Connection, heat_id: &str) -> Result<usize, DatabaseError> {
    let heat = fetch_heat(conn, heat_id).await?;
    rank_of(conn, &heat).await
}

/// For every workout of the competition, the heat at `index`.
///
/// Workouts with fewer than `index + 1` heats contribute nothing.
pub(crate) async fn heats_at_index(
    conn: &libsql::Connection,
    competition_id: &str,
    index: usize,
) -> Result<Vec<Heat>, DatabaseError> {
    query_all(
        conn,
        &format!(
            "SELECT {HEAT_COLS} FROM (
                SELECT h.id, h.workout_id, h.start_time, h.sequence, h.max_limit_per_heat,
                       h.created_at, w.created_at AS workout_created, w.rowid AS workout_rowid,
                       ROW_NUMBER() OVER (
                           PARTITION BY h.workout_id ORDER BY h.start_time, h.sequence, h.id
                       ) - 1 AS heat_rank
                FROM heats h JOIN workouts w ON w.id = h.workout_id
                WHERE w.competition_id = ?1
             )
             WHERE heat_rank = ?2
             ORDER BY workout_created, workout_rowid"
        ),
        libsql::params![competition_id, to_sql_int(index)?],
        row_to_heat,
    )
    .await
}

pub(crate) async fn linked_heats(
    conn: &libsql::Connection,
    heat_id: &str,
) -> Result<LinkedHeats, DatabaseError> {
    let heat = fetch_heat(conn, heat_id).await?;
    let competition_id = competition_of_workout(conn, &heat.workout_id).await?;
    let index = rank_of(conn, &heat).await?;
    let heats = heats_at_index(conn, &competition_id, index).await?;
    tracing::debug!(heat = %heat_id, index, linked = heats.len(), "resolved linked heats");
    Ok(LinkedHeats {
        competition_id,
        index,
        heats,
    })
}

impl HeatService {
    /// Zero-based rank of a heat within its workout.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the heat does not exist.
    pub async fn index_of(&self, heat_id: &str) -> Result<usize, DatabaseError> {
        index_of(self.db().conn(), heat_id).await
    }

    /// The heat at `index` in every workout of the competition that has one.
    pub async fn heats_at_index(
        &self,
        competition_id: &str,
        index: usize,
    ) -> Result<Vec<Heat>, DatabaseError> {
        heats_at_index(self.db().conn(), competition_id, index).await
    }

    /// Index and linked set of a heat.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the heat does not exist.
    pub async fn linked_heats(&self, heat_id: &str) -> Result<LinkedHeats, DatabaseError> {
        linked_heats(self.db().conn(), heat_id).await
    }
}
