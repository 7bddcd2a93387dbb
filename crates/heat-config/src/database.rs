//! libSQL database configuration.

use serde::{Deserialize, Serialize};

/// In-memory database path understood by libSQL.
pub const MEMORY_PATH: &str = ":memory:";

fn default_path() -> String {
    ".heat/heat.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote libSQL URL (e.g., `libsql://events.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the remote database has both URL and token.
    pub fn is_remote_configured(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}
