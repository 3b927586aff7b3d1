use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::models::SearchLogEntry;
use crate::utils::timestamps::DISPLAY_FORMAT;

pub const DEFAULT_RECENT_LIMIT: usize = 5;

impl SearchLogEntry {
    /// Entry stamped with the current local time
    pub fn now(query: &str, start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            query: query.to_string(),
            start_date: start_date.unwrap_or_default().to_string(),
            end_date: end_date.unwrap_or_default().to_string(),
            timestamp: Local::now().format(DISPLAY_FORMAT).to_string(),
        }
    }
}

/// Read the whole log. A missing file is an empty log; so is one that does not parse,
/// which is reported as a warning. Read failures propagate.
fn read_log(path: &Path) -> Result<Vec<SearchLogEntry>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read search log {}", path.display()));
        }
    };

    match serde_json::from_str(&contents) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Search log is malformed, ignoring it");
            Ok(Vec::new())
        }
    }
}

/// Append `entry` to the log at `path`, replacing the file atomically (temp file + rename)
pub fn log_search(path: &Path, entry: &SearchLogEntry) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("Failed to create search log directory")?;
    }

    let mut entries = read_log(path)?;
    entries.push(entry.clone());

    let json = serde_json::to_string_pretty(&entries).context("Failed to serialize search log")?;
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    fs::write(&temp, json).context("Failed to write search log temp file")?;
    fs::rename(&temp, path).context("Failed to rename search log temp file")?;

    tracing::debug!(query = %entry.query, total = entries.len(), "Logged search");
    Ok(())
}

/// The last `limit` searches, oldest first
pub fn recent_searches(path: &Path, limit: usize) -> Result<Vec<SearchLogEntry>> {
    let entries = read_log(path)?;
    let skip = entries.len().saturating_sub(limit);
    Ok(entries.into_iter().skip(skip).collect())
}
