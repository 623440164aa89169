//! Database schema management
//!
//! Schema definitions for the local (SQLite) store. The SQL Server table is
//! owned by the server side and is never created from here.

use crate::error::{RegistryError, RegistryResult};
use rusqlite::Connection;

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Schema definitions for all tables in the local store
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS metareg_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    /// SQL for creating the registry table
    pub const METADATA_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS metadaten_info (
            datenbank_id TEXT PRIMARY KEY NOT NULL,
            datenbank_name TEXT NOT NULL,
            verantwortlicher_person TEXT,
            rolle TEXT NOT NULL CHECK (rolle IN ('Admin', 'Data Engineer', 'Analyst', 'Viewer', 'Manager')),
            pfad_quellen TEXT,
            letztes_update TEXT NOT NULL
        );
    "#;
}

/// Schema manager for the local store
///
/// Handles schema initialization and version checking.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create all tables if they don't exist and record the schema version
    pub fn initialize(&self) -> RegistryResult<()> {
        self.conn
            .execute(SchemaDefinitions::META_TABLE, [])
            .map_err(|e| schema_error("create metareg_meta table", e))?;

        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;

        self.conn
            .execute(SchemaDefinitions::METADATA_TABLE, [])
            .map_err(|e| schema_error("create metadaten_info table", e))?;

        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> RegistryResult<SchemaStatus> {
        if !self.table_exists("metareg_meta")? {
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version > SCHEMA_VERSION {
            return Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            });
        }

        if self.table_exists("metadaten_info")? {
            Ok(SchemaStatus::Current)
        } else {
            Ok(SchemaStatus::Corrupted)
        }
    }

    /// Bring a freshly opened store to a usable schema
    ///
    /// Missing tables are created; existing rows are never dropped. A store
    /// written by a newer schema version is refused.
    pub fn ensure_current(&self) -> RegistryResult<()> {
        match self.check_status()? {
            SchemaStatus::Current => Ok(()),
            SchemaStatus::NotInitialized | SchemaStatus::Corrupted => self.initialize(),
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => Err(RegistryError::Configuration(format!(
                "store schema v{} is newer than supported v{}",
                database_version, required_version
            ))),
        }
    }

    /// Get the current schema version from the database
    pub fn get_schema_version(&self) -> RegistryResult<u32> {
        let version = self
            .get_meta("schema_version")?
            .unwrap_or_else(|| "0".to_string());

        version.parse().map_err(|e| {
            RegistryError::StoreRead(format!("invalid schema version '{}': {}", version, e))
        })
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> RegistryResult<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO metareg_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
                [key, value],
            )
            .map_err(|e| schema_error("set meta value", e))?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> RegistryResult<Option<String>> {
        let result = self.conn.query_row(
            "SELECT value FROM metareg_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(RegistryError::StoreRead(format!(
                "failed to get meta value: {}",
                e
            ))),
        }
    }

    fn table_exists(&self, table: &str) -> RegistryResult<bool> {
        let exists: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| RegistryError::StoreRead(format!("failed to inspect schema: {}", e)))?;
        Ok(exists > 0)
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Meta table present but the registry table is missing
    Corrupted,
}

fn schema_error(action: &str, e: rusqlite::Error) -> RegistryError {
    RegistryError::Connection(format!("failed to {}: {}", action, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys=ON", []).unwrap();
        conn
    }

    #[test]
    fn test_schema_not_initialized() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        assert_eq!(
            manager.check_status().unwrap(),
            SchemaStatus::NotInitialized
        );
    }

    #[test]
    fn test_schema_initialize() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
        assert_eq!(manager.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_missing_table_is_repaired_without_losing_meta() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();
        manager.set_meta("note", "kept").unwrap();

        conn.execute("DROP TABLE metadaten_info", []).unwrap();
        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Corrupted);

        manager.ensure_current().unwrap();
        assert_eq!(manager.check_status().unwrap(), SchemaStatus::Current);
        assert_eq!(manager.get_meta("note").unwrap(), Some("kept".to_string()));
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);
        manager.initialize().unwrap();
        manager
            .set_meta("schema_version", &(SCHEMA_VERSION + 1).to_string())
            .unwrap();

        assert!(matches!(
            manager.check_status().unwrap(),
            SchemaStatus::Incompatible { .. }
        ));
        assert!(matches!(
            manager.ensure_current(),
            Err(RegistryError::Configuration(_))
        ));
    }

    #[test]
    fn test_role_check_constraint() {
        let conn = create_test_db();
        SchemaManager::new(&conn).initialize().unwrap();

        let result = conn.execute(
            "INSERT INTO metadaten_info (datenbank_id, datenbank_name, rolle, letztes_update)
             VALUES ('db1', 'Sales DB', 'Owner', '2024-01-01 00:00:00+00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_meta_operations() {
        let conn = create_test_db();
        let manager = SchemaManager::new(&conn);

        manager.initialize().unwrap();

        manager.set_meta("test_key", "test_value").unwrap();
        let value = manager.get_meta("test_key").unwrap();
        assert_eq!(value, Some("test_value".to_string()));

        let missing = manager.get_meta("nonexistent").unwrap();
        assert_eq!(missing, None);
    }
}
