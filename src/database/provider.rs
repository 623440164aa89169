//! Connection provider
//!
//! Turns validated [`StoreSettings`] into a shared [`StoreHandle`]. The handle
//! is opened on first use and reused until [`ConnectionProvider::close`].

use crate::config::StoreSettings;
use crate::database::core::{DatabaseConn, SchemaManager};
use crate::database::registry::{
    MetadataRecord, MetadataRepository, RecordDraft, RecordFields, SqliteMetadataRepository,
    WriteOutcome,
};
use crate::error::{RegistryError, RegistryResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[cfg(feature = "mssql")]
use crate::database::registry::{MssqlConn, MssqlMetadataRepository};

/// An open store, shared by every caller of the provider
pub enum StoreHandle {
    Sqlite(Mutex<DatabaseConn>),
    #[cfg(feature = "mssql")]
    Mssql(MssqlConn),
}

impl StoreHandle {
    /// Open a store without retrying
    pub fn open(settings: &StoreSettings) -> RegistryResult<Self> {
        match settings {
            StoreSettings::Sqlite { path } => {
                let db = DatabaseConn::open_path(path)?;
                SchemaManager::new(&db.conn).ensure_current()?;
                info!(path = %path, "opened sqlite registry store");
                Ok(StoreHandle::Sqlite(Mutex::new(db)))
            }
            #[cfg(feature = "mssql")]
            StoreSettings::SqlServer(s) => Ok(StoreHandle::Mssql(MssqlConn::connect(s)?)),
            #[cfg(not(feature = "mssql"))]
            StoreSettings::SqlServer(_) => Err(RegistryError::Configuration(
                "SQL Server support is not enabled in this build (feature `mssql`)".to_string(),
            )),
        }
    }

    /// In-memory SQLite store with the schema in place
    pub fn in_memory() -> RegistryResult<Self> {
        let db = DatabaseConn::open_in_memory()?;
        SchemaManager::new(&db.conn).initialize()?;
        Ok(StoreHandle::Sqlite(Mutex::new(db)))
    }

    fn lock_sqlite(db: &Mutex<DatabaseConn>) -> RegistryResult<MutexGuard<'_, DatabaseConn>> {
        db.lock()
            .map_err(|_| RegistryError::Connection("sqlite connection lock poisoned".to_string()))
    }
}

impl MetadataRepository for StoreHandle {
    fn list_all(&self) -> RegistryResult<Vec<MetadataRecord>> {
        match self {
            StoreHandle::Sqlite(db) => {
                let db = Self::lock_sqlite(db)?;
                SqliteMetadataRepository::new(&db.conn).list_all()
            }
            #[cfg(feature = "mssql")]
            StoreHandle::Mssql(conn) => MssqlMetadataRepository::new(conn).list_all(),
        }
    }

    fn create(&self, draft: &RecordDraft) -> RegistryResult<MetadataRecord> {
        match self {
            StoreHandle::Sqlite(db) => {
                let db = Self::lock_sqlite(db)?;
                SqliteMetadataRepository::new(&db.conn).create(draft)
            }
            #[cfg(feature = "mssql")]
            StoreHandle::Mssql(conn) => MssqlMetadataRepository::new(conn).create(draft),
        }
    }

    fn update(&self, database_id: &str, fields: &RecordFields) -> RegistryResult<WriteOutcome> {
        match self {
            StoreHandle::Sqlite(db) => {
                let db = Self::lock_sqlite(db)?;
                SqliteMetadataRepository::new(&db.conn).update(database_id, fields)
            }
            #[cfg(feature = "mssql")]
            StoreHandle::Mssql(conn) => {
                MssqlMetadataRepository::new(conn).update(database_id, fields)
            }
        }
    }

    fn delete(&self, database_id: &str) -> RegistryResult<WriteOutcome> {
        match self {
            StoreHandle::Sqlite(db) => {
                let db = Self::lock_sqlite(db)?;
                SqliteMetadataRepository::new(&db.conn).delete(database_id)
            }
            #[cfg(feature = "mssql")]
            StoreHandle::Mssql(conn) => MssqlMetadataRepository::new(conn).delete(database_id),
        }
    }
}

/// Lazily connects to the configured store and hands out the shared handle
pub struct ConnectionProvider {
    settings: StoreSettings,
    handle: Mutex<Option<Arc<StoreHandle>>>,
}

impl ConnectionProvider {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            handle: Mutex::new(None),
        }
    }

    /// The shared handle, connecting on first call
    pub fn handle(&self) -> RegistryResult<Arc<StoreHandle>> {
        let mut slot = self.slot()?;
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        debug!(driver = %self.settings.driver(), "opening store handle");
        let handle = Arc::new(StoreHandle::open(&self.settings)?);
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Whether a handle is currently open
    pub fn is_open(&self) -> bool {
        self.slot().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Drop the shared handle; the next [`handle`](Self::handle) reconnects
    ///
    /// Callers still holding a clone keep it alive until they drop it.
    pub fn close(&self) -> RegistryResult<()> {
        if self.slot()?.take().is_some() {
            debug!("closed store handle");
        }
        Ok(())
    }

    fn slot(&self) -> RegistryResult<MutexGuard<'_, Option<Arc<StoreHandle>>>> {
        self.handle
            .lock()
            .map_err(|_| RegistryError::Connection("provider lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::registry::Role;

    fn sqlite_settings(dir: &tempfile::TempDir) -> StoreSettings {
        StoreSettings::Sqlite {
            path: dir
                .path()
                .join("registry.sqlite3")
                .to_string_lossy()
                .to_string(),
        }
    }

    #[test]
    fn test_handle_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ConnectionProvider::new(sqlite_settings(&dir));
        assert!(!provider.is_open());

        let first = provider.handle().unwrap();
        let second = provider.handle().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(provider.is_open());
    }

    #[test]
    fn test_close_then_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ConnectionProvider::new(sqlite_settings(&dir));

        let first = provider.handle().unwrap();
        first
            .create(&RecordDraft::new(
                "db1",
                RecordFields::new("Sales DB").with_role(Role::Analyst),
            ))
            .unwrap();
        drop(first);

        provider.close().unwrap();
        assert!(!provider.is_open());

        let reopened = provider.handle().unwrap();
        let records = reopened.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].database_id, "db1");
    }

    #[test]
    fn test_fresh_provider_sees_same_store() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ConnectionProvider::new(sqlite_settings(&dir));
        writer
            .handle()
            .unwrap()
            .create(&RecordDraft::new("db1", RecordFields::new("Sales DB")))
            .unwrap();

        let reader = ConnectionProvider::new(sqlite_settings(&dir));
        assert_eq!(reader.handle().unwrap().list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_unreachable_sqlite_path_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ConnectionProvider::new(StoreSettings::Sqlite {
            path: dir
                .path()
                .join("missing")
                .join("registry.sqlite3")
                .to_string_lossy()
                .to_string(),
        });
        assert!(matches!(
            provider.handle(),
            Err(RegistryError::Connection(_))
        ));
        assert!(!provider.is_open());
    }

    #[test]
    fn test_in_memory_handle() {
        let handle = StoreHandle::in_memory().unwrap();
        assert!(handle.list_all().unwrap().is_empty());
    }
}
