//! Heat update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeatUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Replaces the heat's eligibility set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type_ids: Option<Vec<String>>,
    /// Applied to every linked heat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit_per_heat: Option<i64>,
}

impl HeatUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.ticket_type_ids.is_none() && self.max_limit_per_heat.is_none()
    }
}

pub struct HeatUpdateBuilder(HeatUpdate);

impl HeatUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(HeatUpdate::default())
    }

    #[must_use]
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.0.start_time = Some(start_time);
        self
    }

    #[must_use]
    pub fn ticket_type_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.ticket_type_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn max_limit_per_heat(mut self, limit: i64) -> Self {
        self.0.max_limit_per_heat = Some(limit);
        self
    }

    #[must_use]
    pub fn build(self) -> HeatUpdate {
        self.0
    }
}

impl Default for HeatUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
