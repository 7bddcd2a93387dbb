//! Row-to-entity parsing helpers and small query utilities.
//!
//! Timestamps are written as RFC 3339 UTC with fixed microsecond precision so
//! that string order equals time order; `start_time` ordering relies on it.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use libsql::params::IntoParams;

use crate::error::DatabaseError;

/// Parse a TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 and `SQLite`'s `datetime('now')` format.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Format a timestamp for storage.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop sub-microsecond precision so a value survives a storage roundtrip unchanged.
#[must_use]
pub fn normalize_datetime(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

/// Current time at storage precision.
#[must_use]
pub fn now() -> DateTime<Utc> {
    normalize_datetime(Utc::now())
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER 0/1 column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Convert an in-memory count or index to an SQL integer.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the value does not fit.
pub fn to_sql_int(value: usize) -> Result<i64, DatabaseError> {
    i64::try_from(value)
        .map_err(|_| DatabaseError::InvalidState(format!("value {value} exceeds SQL integer range")))
}

/// Generate a prefixed ID on the given connection (or transaction).
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

/// Run a query and map every row.
///
/// # Errors
///
/// Returns `DatabaseError` if the query or a row conversion fails.
pub async fn query_all<T, P, F>(
    conn: &libsql::Connection,
    sql: &str,
    params: P,
    map: F,
) -> Result<Vec<T>, DatabaseError>
where
    P: IntoParams,
    F: Fn(&libsql::Row) -> Result<T, DatabaseError>,
{
    let mut rows = conn.query(sql, params).await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(map(&row)?);
    }
    Ok(out)
}

/// Run a query and map the first row, if any.
///
/// # Errors
///
/// Returns `DatabaseError` if the query or the row conversion fails.
pub async fn query_opt<T, P, F>(
    conn: &libsql::Connection,
    sql: &str,
    params: P,
    map: F,
) -> Result<Option<T>, DatabaseError>
where
    P: IntoParams,
    F: Fn(&libsql::Row) -> Result<T, DatabaseError>,
{
    let mut rows = conn.query(sql, params).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(map(&row)?)),
        None => Ok(None),
    }
}

/// Run a single-value `SELECT COUNT(*)`-style query.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn query_count<P: IntoParams>(
    conn: &libsql::Connection,
    sql: &str,
    params: P,
) -> Result<i64, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_both_datetime_formats() {
        let rfc = parse_datetime("2026-03-14T09:00:00.000000Z").unwrap();
        let sqlite = parse_datetime("2026-03-14 09:00:00").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(parse_datetime("not a date").is_err());
    }

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 10, 30, 0).unwrap();
        let mut strings = [format_datetime(&late), format_datetime(&early)];
        strings.sort();
        assert_eq!(strings[0], format_datetime(&early));
        assert_eq!(strings[0].len(), strings[1].len());
    }

    #[test]
    fn normalized_datetime_roundtrips() {
        let now = now();
        assert_eq!(parse_datetime(&format_datetime(&now)).unwrap(), now);
    }
}
