//! SQLite archive access.
//!
//! An [`Archive`] owns exactly one connection for the duration of an operation; dropping it
//! releases the connection on every exit path. Queries live as free functions over
//! `&Connection` in [`reader`] and [`writer`] so they run unchanged inside a transaction.

pub mod reader;
pub mod schema;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

pub use reader::ConversationQuery;

/// How long a statement waits on a lock held by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to prepare archive location: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Query parameter is required")]
    EmptyQuery,

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Archive does not exist: {}", path.display())]
    MissingArchive { path: PathBuf },
}

impl ArchiveError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A single open connection to the conversation archive
pub struct Archive {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Archive {
    /// Open (creating if needed) the archive at `path` and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let archive = Self { conn, path: Some(path.to_path_buf()) };
        archive.init()?;
        tracing::debug!(path = %path.display(), "Opened archive");
        Ok(archive)
    }

    /// Open an archive that must already exist; nothing is created on disk
    pub fn open_existing(path: &Path) -> Result<Self, ArchiveError> {
        if !path.is_file() {
            return Err(ArchiveError::MissingArchive { path: path.to_path_buf() });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        let archive = Self { conn, path: Some(path.to_path_buf()) };
        archive.init()?;
        tracing::debug!(path = %path.display(), "Opened existing archive");
        Ok(archive)
    }

    /// Open a private in-memory archive (tests and benchmarks)
    pub fn open_in_memory() -> Result<Self, ArchiveError> {
        let archive = Self { conn: Connection::open_in_memory()?, path: None };
        archive.init()?;
        Ok(archive)
    }

    fn init(&self) -> Result<(), ArchiveError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::create_schema(&self.conn)?;
        Ok(())
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access, needed to start a transaction
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Location on disk, `None` for in-memory archives
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
