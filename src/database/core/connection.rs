//! SQLite connection management
//!
//! This module provides the connection wrapper behind the local (SQLite) store.

use crate::error::{RegistryError, RegistryResult};
use rusqlite::Connection;
use std::time::Duration;
use tracing::debug;

/// How long a statement waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Core SQLite connection wrapper
///
/// `DatabaseConn` handles both file-based and in-memory databases with
/// the same configuration. Failures to open or configure the file are
/// reported as [`RegistryError::Connection`].
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> RegistryResult<Self> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| {
                RegistryError::Connection(format!("failed to open database at '{}': {}", p, e))
            })?,
            None => Connection::open_in_memory().map_err(|e| {
                RegistryError::Connection(format!("failed to create in-memory database: {}", e))
            })?,
        };
        debug!(path = path.unwrap_or(":memory:"), "opened sqlite store");

        let db = DatabaseConn { conn };
        db.configure(path.is_some())?;
        Ok(db)
    }

    /// Open a database file (convenience method)
    pub fn open_path(path: &str) -> RegistryResult<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> RegistryResult<Self> {
        Self::open(None)
    }

    fn configure(&self, file_backed: bool) -> RegistryResult<()> {
        if file_backed {
            // WAL lets a second session read while another one writes
            let _: String = self
                .conn
                .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
                .map_err(|e| configure_error("journal mode", e))?;
        }

        self.conn
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| configure_error("busy timeout", e))?;

        self.conn
            .execute("PRAGMA foreign_keys=ON", [])
            .map_err(|e| configure_error("foreign keys", e))?;

        Ok(())
    }
}

fn configure_error(setting: &str, e: rusqlite::Error) -> RegistryError {
    RegistryError::Connection(format!("failed to set {}: {}", setting, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.sqlite3");
        let db = DatabaseConn::open_path(path.to_str().unwrap());
        assert!(db.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_open_missing_directory_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("registry.sqlite3");
        match DatabaseConn::open_path(path.to_str().unwrap()) {
            Err(RegistryError::Connection(_)) => {}
            other => panic!("expected connection error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_file_store_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.sqlite3");
        let db = DatabaseConn::open_path(path.to_str().unwrap()).unwrap();
        let mode: String = db
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
