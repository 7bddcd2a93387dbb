//! Scheduling engine configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Capacity used when a competition has no score settings row.
const fn default_max_per_heat() -> i64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Fallback `max_limit_per_heat` for new heats.
    #[serde(default = "default_max_per_heat")]
    pub default_max_per_heat: i64,

    /// Reject placements into full heats and capacity cuts below occupancy.
    #[serde(default)]
    pub enforce_capacity: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_max_per_heat: default_max_per_heat(),
            enforce_capacity: false,
        }
    }
}

impl SchedulerConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the fallback capacity is below one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_max_per_heat < 1 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.default_max_per_heat".into(),
                reason: format!("must be at least 1, got {}", self.default_max_per_heat),
            });
        }
        Ok(())
    }
}
