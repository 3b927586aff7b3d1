use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "CHAT_ARCHIVE_HOME";
/// Environment variable overriding the archive database path
pub const DATABASE_ENV: &str = "CHAT_ARCHIVE_DB";
/// Environment variable overriding the search log path
pub const SEARCH_LOG_ENV: &str = "CHAT_ARCHIVE_SEARCH_LOG";

const APP_DIR_NAME: &str = "chat-archive-explorer";

/// Get the data directory holding the archive and the search log
///
/// Resolution order: `$CHAT_ARCHIVE_HOME`, then the platform data directory
/// (`~/.local/share/chat-archive-explorer` on Linux).
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(home) = env_path(HOME_ENV) {
        return Ok(home);
    }
    let base = dirs::data_dir().context("Failed to determine platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Read a non-empty path from the environment
pub fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}
