//! Competition, score settings and ticket type repository.
//!
//! These rows are owned by organizer and ticketing tooling; the engine only
//! needs to create them for setup and read them while scheduling.

use heat_core::entities::{Competition, ScoreSettings, TicketType};
use heat_core::enums::EntityKind;
use heat_core::ids::{PREFIX_COMPETITION, PREFIX_TICKET_TYPE};
use heat_core::requests::validate_capacity;

use crate::HeatDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, generate_id, get_bool, now, parse_datetime, query_all, query_opt};
use crate::service::HeatService;

const COMPETITION_COLS: &str = "id, name, is_active, created_at";
const TICKET_TYPE_COLS: &str = "id, competition_id, name, team_size, is_volunteer";

fn row_to_competition(row: &libsql::Row) -> Result<Competition, DatabaseError> {
    Ok(Competition {
        id: row.get(0)?,
        name: row.get(1)?,
        is_active: get_bool(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

fn row_to_ticket_type(row: &libsql::Row) -> Result<TicketType, DatabaseError> {
    Ok(TicketType {
        id: row.get(0)?,
        competition_id: row.get(1)?,
        name: row.get(2)?,
        team_size: row.get(3)?,
        is_volunteer: get_bool(row, 4)?,
    })
}

pub(crate) async fn fetch_competition(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Competition, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {COMPETITION_COLS} FROM competitions WHERE id = ?1"),
        [id],
        row_to_competition,
    )
    .await?
    .ok_or_else(|| DatabaseError::not_found(EntityKind::Competition, id))
}

pub(crate) async fn fetch_score_settings(
    conn: &libsql::Connection,
    competition_id: &str,
) -> Result<Option<ScoreSettings>, DatabaseError> {
    query_opt(
        conn,
        "SELECT competition_id, default_max_per_heat FROM score_settings WHERE competition_id = ?1",
        [competition_id],
        |row| {
            Ok(ScoreSettings {
                competition_id: row.get(0)?,
                default_max_per_heat: row.get(1)?,
            })
        },
    )
    .await
}

pub(crate) async fn fetch_ticket_type(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<TicketType>, DatabaseError> {
    query_opt(
        conn,
        &format!("SELECT {TICKET_TYPE_COLS} FROM ticket_types WHERE id = ?1"),
        [id],
        row_to_ticket_type,
    )
    .await
}

/// Ticket types that compete in heats (volunteers excluded).
pub(crate) async fn fetch_competing_ticket_types(
    conn: &libsql::Connection,
    competition_id: &str,
) -> Result<Vec<TicketType>, DatabaseError> {
    query_all(
        conn,
        &format!(
            "SELECT {TICKET_TYPE_COLS} FROM ticket_types
             WHERE competition_id = ?1 AND is_volunteer = 0 ORDER BY name, id"
        ),
        [competition_id],
        row_to_ticket_type,
    )
    .await
}

async fn insert_competition(
    conn: &libsql::Connection,
    name: &str,
    capacity: i64,
) -> Result<Competition, DatabaseError> {
    let now = now();
    let id = generate_id(conn, PREFIX_COMPETITION).await?;
    conn.execute(
        &format!("INSERT INTO competitions ({COMPETITION_COLS}) VALUES (?1, ?2, 1, ?3)"),
        libsql::params![id.as_str(), name, format_datetime(&now)],
    )
    .await?;
    conn.execute(
        "INSERT INTO score_settings (competition_id, default_max_per_heat) VALUES (?1, ?2)",
        libsql::params![id.as_str(), capacity],
    )
    .await?;
    Ok(Competition {
        id,
        name: name.to_string(),
        is_active: true,
        created_at: now,
    })
}

impl HeatService {
    /// Create a competition with its score settings row.
    ///
    /// `default_max_per_heat` falls back to the scheduler configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a capacity below one.
    pub async fn create_competition(
        &self,
        name: &str,
        default_max_per_heat: Option<i64>,
    ) -> Result<Competition, DatabaseError> {
        let capacity = default_max_per_heat.unwrap_or(self.scheduler().default_max_per_heat);
        validate_capacity(capacity)?;

        let tx = self.db().begin().await?;
        let result = insert_competition(&tx, name, capacity).await;
        HeatDb::finish(tx, result).await
    }

    pub async fn get_competition(&self, id: &str) -> Result<Competition, DatabaseError> {
        fetch_competition(self.db().conn(), id).await
    }

    /// Score settings of a competition, if the row exists.
    pub async fn score_settings(
        &self,
        competition_id: &str,
    ) -> Result<Option<ScoreSettings>, DatabaseError> {
        fetch_score_settings(self.db().conn(), competition_id).await
    }

    /// Register a ticket type for a competition.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the competition does not exist.
    pub async fn create_ticket_type(
        &self,
        competition_id: &str,
        name: &str,
        team_size: i64,
        is_volunteer: bool,
    ) -> Result<TicketType, DatabaseError> {
        if team_size < 1 {
            return Err(DatabaseError::Validation(format!(
                "team size must be at least 1, got {team_size}"
            )));
        }
        fetch_competition(self.db().conn(), competition_id).await?;

        let id = self.db().generate_id(PREFIX_TICKET_TYPE).await?;
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO ticket_types ({TICKET_TYPE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    id.as_str(),
                    competition_id,
                    name,
                    team_size,
                    i64::from(is_volunteer)
                ],
            )
            .await?;

        Ok(TicketType {
            id,
            competition_id: competition_id.to_string(),
            name: name.to_string(),
            team_size,
            is_volunteer,
        })
    }

    pub async fn get_ticket_type(&self, id: &str) -> Result<TicketType, DatabaseError> {
        fetch_ticket_type(self.db().conn(), id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityKind::TicketType, id))
    }

    pub async fn ticket_types_for_competition(
        &self,
        competition_id: &str,
    ) -> Result<Vec<TicketType>, DatabaseError> {
        query_all(
            self.db().conn(),
            &format!(
                "SELECT {TICKET_TYPE_COLS} FROM ticket_types WHERE competition_id = ?1 ORDER BY name, id"
            ),
            [competition_id],
            row_to_ticket_type,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn create_competition_writes_score_settings() {
        let svc = test_service().await;
        let comp = svc.create_competition("Spring Throwdown", Some(12)).await.unwrap();
        assert!(comp.id.starts_with("cmp-"));
        assert!(comp.is_active);

        let fetched = svc.get_competition(&comp.id).await.unwrap();
        assert_eq!(fetched, comp);

        let settings = svc.score_settings(&comp.id).await.unwrap().unwrap();
        assert_eq!(settings.default_max_per_heat, 12);
    }

    #[tokio::test]
    async fn create_competition_defaults_capacity_from_config() {
        let svc = test_service().await;
        let comp = svc.create_competition("Default cap", None).await.unwrap();
        let settings = svc.score_settings(&comp.id).await.unwrap().unwrap();
        assert_eq!(settings.default_max_per_heat, 10);
    }

    #[tokio::test]
    async fn create_competition_rejects_zero_capacity() {
        let svc = test_service().await;
        let result = svc.create_competition("Bad", Some(0)).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_competition_is_not_found() {
        let svc = test_service().await;
        let result = svc.get_competition("cmp-missing0").await;
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { entity: EntityKind::Competition, .. })
        ));
    }

    #[tokio::test]
    async fn competing_ticket_types_exclude_volunteers() {
        let svc = test_service().await;
        let comp = svc.create_competition("Tickets", None).await.unwrap();
        let rx = svc.create_ticket_type(&comp.id, "RX", 1, false).await.unwrap();
        svc.create_ticket_type(&comp.id, "Volunteer", 1, true).await.unwrap();

        let all = svc.ticket_types_for_competition(&comp.id).await.unwrap();
        assert_eq!(all.len(), 2);

        let competing = fetch_competing_ticket_types(svc.db().conn(), &comp.id)
            .await
            .unwrap();
        assert_eq!(competing, vec![rx]);
    }

    #[tokio::test]
    async fn ticket_type_requires_competition() {
        let svc = test_service().await;
        let result = svc.create_ticket_type("cmp-missing0", "RX", 1, false).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
