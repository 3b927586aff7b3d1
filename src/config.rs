//! Runtime configuration: where the archive and search log live, and listing defaults.
//!
//! Each path is resolved independently: explicit flag, then its environment variable
//! (`CHAT_ARCHIVE_DB`, `CHAT_ARCHIVE_SEARCH_LOG`), then a file in the data directory
//! (`CHAT_ARCHIVE_HOME` or the platform data dir).

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::browse::DEFAULT_PER_PAGE;
use crate::utils::environment::{DATABASE_ENV, SEARCH_LOG_ENV};
use crate::utils::{env_path, get_data_dir};

const DATABASE_FILE: &str = "chat_archive.db";
const SEARCH_LOG_FILE: &str = "search_log.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub search_log_path: PathBuf,
    pub per_page: usize,
}

impl AppConfig {
    /// Resolve paths from flags, environment and the data directory
    pub fn resolve(database: Option<&Path>, search_log: Option<&Path>) -> Result<Self> {
        let database_path = match database.map(Path::to_path_buf).or_else(|| env_path(DATABASE_ENV)) {
            Some(path) => path,
            None => get_data_dir()?.join(DATABASE_FILE),
        };
        let search_log_path =
            match search_log.map(Path::to_path_buf).or_else(|| env_path(SEARCH_LOG_ENV)) {
                Some(path) => path,
                None => get_data_dir()?.join(SEARCH_LOG_FILE),
            };

        Ok(Self { database_path, search_log_path, per_page: DEFAULT_PER_PAGE })
    }

    /// Everything under one directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            database_path: dir.join(DATABASE_FILE),
            search_log_path: dir.join(SEARCH_LOG_FILE),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        if per_page > 0 {
            self.per_page = per_page;
        }
        self
    }
}
