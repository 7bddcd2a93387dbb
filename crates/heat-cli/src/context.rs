use anyhow::Context;
use heat_config::HeatConfig;
use heat_db::service::HeatService;

use crate::bootstrap::ensure_database_dir;

/// Everything a command handler needs.
pub struct AppContext {
    pub service: HeatService,
    pub config: HeatConfig,
}

impl AppContext {
    pub async fn init(config: HeatConfig) -> anyhow::Result<Self> {
        warn_unconfigured(&config);
        ensure_database_dir(&config)?;
        let service = HeatService::from_config(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        Ok(Self { service, config })
    }
}

pub fn warn_unconfigured(config: &HeatConfig) {
    if let Some(notice) = remote_database_notice(config) {
        tracing::warn!(url = %config.database.url, "{notice}");
    }
}

/// The engine only opens the local database, so any remote URL is ignored.
fn remote_database_notice(config: &HeatConfig) -> Option<&'static str> {
    if config.database.url.is_empty() {
        None
    } else if config.database.is_remote_configured() {
        Some("remote database is configured but not supported; using the local database")
    } else {
        Some("database.url is set without database.auth_token; using the local database")
    }
}
