use chrono::{DateTime, Utc};
use heat_core::requests::CapacityChange;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_start_time(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| anyhow::anyhow!("invalid start time '{raw}': {error}"))
}

/// Parse `HEAT_ID=MAX`.
pub fn parse_capacity_change(raw: &str) -> anyhow::Result<CapacityChange> {
    let (heat_id, max) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid capacity change '{raw}': expected HEAT_ID=MAX"))?;
    let max_entries = max
        .trim()
        .parse::<i64>()
        .map_err(|error| anyhow::anyhow!("invalid capacity in '{raw}': {error}"))?;
    Ok(CapacityChange {
        heat_id: heat_id.trim().to_string(),
        max_entries,
    })
}
