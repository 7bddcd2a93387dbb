use std::path::{Path, PathBuf};

use anyhow::Context;
use heat_config::{HeatConfig, PROJECT_CONFIG_PATH};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct InitResponse {
    config_path: String,
    config_written: bool,
    database: String,
    remote_configured: bool,
}

/// Handle `heat init`: write `.heat/config.toml` and migrate the database.
pub async fn handle(args: &InitArgs, config: HeatConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config_path = PathBuf::from(PROJECT_CONFIG_PATH);
    let config_written = if config_path.exists() && !args.force {
        false
    } else {
        write_project_config(&config_path, &config)?;
        true
    };

    let ctx = AppContext::init(config).await?;
    tracing::info!(database = %ctx.config.database.path, "initialized heat project");

    output(
        &InitResponse {
            config_path: config_path.display().to_string(),
            config_written,
            database: ctx.config.database.path.clone(),
            remote_configured: ctx.config.database.is_remote_configured(),
        },
        flags.format,
    )
}

fn write_project_config(path: &Path, config: &HeatConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut project = config.clone();
    // Secrets stay in the environment.
    project.database.auth_token.clear();
    let rendered = toml::to_string_pretty(&project).context("failed to render config")?;
    std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_config_round_trips_without_token() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".heat/config.toml");
        let mut config = HeatConfig::default();
        config.database.auth_token = "secret".into();
        config.scheduler.enforce_capacity = true;

        write_project_config(&path, &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("secret"));
        let parsed: HeatConfig = toml::from_str(&text).unwrap();
        assert!(parsed.scheduler.enforce_capacity);
        assert_eq!(parsed.database.path, config.database.path);
    }
}
