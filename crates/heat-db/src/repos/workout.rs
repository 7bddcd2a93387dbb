//! Workout repository and ordered workout teardown.

use heat_core::entities::Workout;
use heat_core::enums::EntityKind;
use heat_core::ids::PREFIX_WORKOUT;

use crate::HeatDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, generate_id, now, parse_datetime, query_all, query_opt};
use crate::repos::competition::fetch_competition;
use crate::service::HeatService;

const SELECT_COLS: &str = "id, competition_id, name, created_at";

/// Creation order; `rowid` breaks same-instant ties by insertion.
const ORDER_BY: &str = "created_at, rowid";

fn row_to_workout(row: &libsql::Row) -> Result<Workout, DatabaseError> {
    Ok(Workout {
        id: row.get(0)?,
        competition_id: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

pub(crate) async fn fetch_workout(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Workout, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {SELECT_COLS} FROM workouts WHERE id = ?1"),
        [id],
        row_to_workout,
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Workout, id))
}

pub(crate) async fn fetch_workouts_for_competition(
    conn: &libsql::Connection,
    competition_id: &str,
) -> Result<Vec<Workout>, DatabaseError> {
    query_all(
        conn,
        &format!("SELECT {SELECT_COLS} FROM workouts WHERE competition_id = ?1 ORDER BY {ORDER_BY}"),
        [competition_id],
        row_to_workout,
    )
    .await
}

/// Delete lanes, eligibility rows, heats, then the workout itself.
async fn teardown_workout(
    conn: &libsql::Connection,
    workout_id: &str,
) -> Result<Workout, DatabaseError> {
    let workout = fetch_workout(conn, workout_id).await?;

    let lanes = conn
        .execute(
            "DELETE FROM lanes WHERE heat_id IN (SELECT id FROM heats WHERE workout_id = ?1)",
            [workout_id],
        )
        .await?;
    conn.execute(
        "DELETE FROM heat_ticket_types WHERE heat_id IN (SELECT id FROM heats WHERE workout_id = ?1)",
        [workout_id],
    )
    .await?;
    let heats = conn
        .execute("DELETE FROM heats WHERE workout_id = ?1", [workout_id])
        .await?;
    conn.execute("DELETE FROM workouts WHERE id = ?1", [workout_id])
        .await?;

    tracing::info!(workout = %workout_id, heats, lanes, "deleted workout");
    Ok(workout)
}

impl HeatService {
    /// Add a workout to a competition.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the competition does not exist.
    pub async fn create_workout(
        &self,
        competition_id: &str,
        name: &str,
    ) -> Result<Workout, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = insert_workout(&tx, competition_id, name).await;
        HeatDb::finish(tx, result).await
    }

    pub async fn get_workout(&self, id: &str) -> Result<Workout, DatabaseError> {
        fetch_workout(self.db().conn(), id).await
    }

    pub async fn workouts_for_competition(
        &self,
        competition_id: &str,
    ) -> Result<Vec<Workout>, DatabaseError> {
        fetch_workouts_for_competition(self.db().conn(), competition_id).await
    }

    /// Delete a workout with all of its heats and lanes in one transaction.
    ///
    /// Returns the deleted workout.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the workout does not exist.
    pub async fn delete_workout(&self, workout_id: &str) -> Result<Workout, DatabaseError> {
        let tx = self.db().begin().await?;
        let result = teardown_workout(&tx, workout_id).await;
        HeatDb::finish(tx, result).await
    }
}

async fn insert_workout(
    conn: &libsql::Connection,
    competition_id: &str,
    name: &str,
) -> Result<Workout, DatabaseError> {
    fetch_competition(conn, competition_id).await?;

    let now = now();
    let id = generate_id(conn, PREFIX_WORKOUT).await?;
    conn.execute(
        &format!("INSERT INTO workouts ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4)"),
        libsql::params![id.as_str(), competition_id, name, format_datetime(&now)],
    )
    .await?;

    Ok(Workout {
        id,
        competition_id: competition_id.to_string(),
        name: name.to_string(),
        created_at: now,
    })
}
