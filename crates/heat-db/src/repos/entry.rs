//! Entry registry.
//!
//! Resolves which entries exist for a competition or ticket type and whether
//! an entry currently holds a lane. Entries themselves come from registration
//! tooling; `create_entry` exists so the engine can be set up and tested.

use heat_core::entities::{Entry, Lane};
use heat_core::enums::{EntityKind, EntryKind};
use heat_core::ids::PREFIX_ENTRY;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, generate_id, get_opt_string, now, parse_datetime, parse_enum, query_all,
    query_count, query_opt,
};
use crate::repos::competition::{fetch_competition, fetch_ticket_type};
use crate::repos::lane::{LANE_COLS, row_to_lane};
use crate::service::HeatService;

const SELECT_COLS: &str = "id, competition_id, ticket_type_id, kind, name, created_at";

fn row_to_entry(row: &libsql::Row) -> Result<Entry, DatabaseError> {
    Ok(Entry {
        id: row.get(0)?,
        competition_id: row.get(1)?,
        ticket_type_id: get_opt_string(row, 2)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        name: row.get(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn fetch_entry(conn: &libsql::Connection, id: &str) -> Result<Entry, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {SELECT_COLS} FROM entries WHERE id = ?1"),
        [id],
        row_to_entry,
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Entry, id))
}

pub(crate) async fn fetch_entries(
    conn: &libsql::Connection,
    competition_id: &str,
    ticket_type_id: Option<&str>,
) -> Result<Vec<Entry>, DatabaseError> {
    match ticket_type_id {
        Some(ticket_type_id) => {
            query_all(
                conn,
                &format!(
                    "SELECT {SELECT_COLS} FROM entries
                     WHERE competition_id = ?1 AND ticket_type_id = ?2 ORDER BY created_at, rowid"
                ),
                libsql::params![competition_id, ticket_type_id],
                row_to_entry,
            )
            .await
        }
        None => {
            query_all(
                conn,
                &format!(
                    "SELECT {SELECT_COLS} FROM entries WHERE competition_id = ?1 ORDER BY created_at, rowid"
                ),
                [competition_id],
                row_to_entry,
            )
            .await
        }
    }
}

/// The entry's lane in one heat, if placed there.
pub(crate) async fn lane_for_entry_in_heat(
    conn: &libsql::Connection,
    entry_id: &str,
    heat_id: &str,
) -> Result<Option<Lane>, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {LANE_COLS} FROM lanes WHERE entry_id = ?1 AND heat_id = ?2"),
        libsql::params![entry_id, heat_id],
        row_to_lane,
    )
    .await
}

/// The entry's lane in any heat of one workout, if placed there.
pub(crate) async fn lane_for_entry_in_workout(
    conn: &libsql::Connection,
    entry_id: &str,
    workout_id: &str,
) -> Result<Option<Lane>, DatabaseError> {
    query_opt(
        conn,
        "SELECT l.id, l.heat_id, l.entry_id, l.number, l.created_at
         FROM lanes l JOIN heats h ON h.id = l.heat_id
         WHERE l.entry_id = ?1 AND h.workout_id = ?2",
        libsql::params![entry_id, workout_id],
        row_to_lane,
    )
    .await
}

pub(crate) async fn fetch_lanes_for_entry(
    conn: &libsql::Connection,
    entry_id: &str,
) -> Result<Vec<Lane>, DatabaseError> {
    query_all(
        conn,
        "SELECT l.id, l.heat_id, l.entry_id, l.number, l.created_at
         FROM lanes l
         JOIN heats h ON h.id = l.heat_id
         JOIN workouts w ON w.id = h.workout_id
         WHERE l.entry_id = ?1
         ORDER BY w.created_at, w.rowid, l.number",
        [entry_id],
        row_to_lane,
    )
    .await
}

impl HeatService {
    /// Register an entry (athlete or team) in a competition.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for a missing competition or ticket
    /// type, and `DatabaseError::InvalidState` if the ticket type belongs to
    /// another competition.
    pub async fn create_entry(
        &self,
        competition_id: &str,
        ticket_type_id: Option<&str>,
        kind: EntryKind,
        name: &str,
    ) -> Result<Entry, DatabaseError> {
        let conn = self.db().conn();
        fetch_competition(conn, competition_id).await?;
        if let Some(ticket_type_id) = ticket_type_id {
            let ticket = fetch_ticket_type(conn, ticket_type_id)
                .await?
                .ok_or_else(|| DatabaseError::not_found(EntityKind::TicketType, ticket_type_id))?;
            if ticket.competition_id != competition_id {
                return Err(DatabaseError::InvalidState(format!(
                    "ticket type {ticket_type_id} belongs to competition {}, not {competition_id}",
                    ticket.competition_id
                )));
            }
        }

        let now = now();
        let id = generate_id(conn, PREFIX_ENTRY).await?;
        conn.execute(
            &format!("INSERT INTO entries ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            libsql::params![
                id.as_str(),
                competition_id,
                ticket_type_id.map_or(libsql::Value::Null, Into::into),
                kind.as_str(),
                name,
                format_datetime(&now)
            ],
        )
        .await?;

        Ok(Entry {
            id,
            competition_id: competition_id.to_string(),
            ticket_type_id: ticket_type_id.map(String::from),
            kind,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_entry(&self, id: &str) -> Result<Entry, DatabaseError> {
        fetch_entry(self.db().conn(), id).await
    }

    /// Entries of a competition, optionally narrowed to one ticket type.
    pub async fn entries_for_competition(
        &self,
        competition_id: &str,
        ticket_type_id: Option<&str>,
    ) -> Result<Vec<Entry>, DatabaseError> {
        fetch_entries(self.db().conn(), competition_id, ticket_type_id).await
    }

    /// Whether the entry holds at least one lane anywhere.
    pub async fn is_entry_assigned(&self, entry_id: &str) -> Result<bool, DatabaseError> {
        let lanes = query_count(
            self.db().conn(),
            "SELECT COUNT(*) FROM lanes WHERE entry_id = ?1",
            [entry_id],
        )
        .await?;
        Ok(lanes > 0)
    }

    /// Every lane of an entry, in workout order.
    pub async fn lanes_for_entry(&self, entry_id: &str) -> Result<Vec<Lane>, DatabaseError> {
        fetch_lanes_for_entry(self.db().conn(), entry_id).await
    }

    /// Entries of a competition that hold no lane in any heat.
    pub async fn unassigned_entries(
        &self,
        competition_id: &str,
    ) -> Result<Vec<Entry>, DatabaseError> {
        query_all(
            self.db().conn(),
            &format!(
                "SELECT {SELECT_COLS} FROM entries e
                 WHERE e.competition_id = ?1
                   AND NOT EXISTS (SELECT 1 FROM lanes l WHERE l.entry_id = e.id)
                 ORDER BY e.created_at, e.rowid"
            ),
            [competition_id],
            row_to_entry,
        )
        .await
    }
}
