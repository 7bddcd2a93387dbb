use std::path::Path;

use anyhow::Context;
use heat_config::HeatConfig;

use crate::cli::GlobalFlags;

/// Load layered config, then apply `--db`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<HeatConfig> {
    let mut config = HeatConfig::load_with_dotenv().context("failed to load heat configuration")?;
    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
    }
    Ok(config)
}

/// Create the parent directory of a file database so libSQL can open it.
pub fn ensure_database_dir(config: &HeatConfig) -> anyhow::Result<()> {
    if config.database.is_in_memory() {
        return Ok(());
    }
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
