//! Metadata registry storage
//!
//! This module owns the `metadaten_info` table:
//! - Record types and role labels shared by every backend
//! - SQLite repository for the local store
//! - SQL Server repository (feature `mssql`)
//!
//! Both repositories implement [`MetadataRepository`], so callers never see
//! which backend answers.

mod record;
mod sqlite;

#[cfg(feature = "mssql")]
mod mssql;

pub use record::{
    MetadataRecord, RecordDraft, RecordFields, Role, WriteOutcome, METADATA_COLUMNS,
    METADATA_TABLE,
};
pub use sqlite::SqliteMetadataRepository;

#[cfg(feature = "mssql")]
pub use mssql::{MssqlConn, MssqlMetadataRepository};

use crate::error::RegistryResult;

/// Read and write access to the registry table
///
/// Each call is a single statement committed on its own. Writes that match
/// no row are not errors; they report zero affected rows.
pub trait MetadataRepository {
    /// Every record, in the backend's natural order
    fn list_all(&self) -> RegistryResult<Vec<MetadataRecord>>;

    /// Insert a new record stamped with the current time
    ///
    /// Fails with `Validation` when the id or name is blank and with
    /// `DuplicateKey` when the id is already registered.
    fn create(&self, draft: &RecordDraft) -> RegistryResult<MetadataRecord>;

    /// Replace the non-key fields of one record and refresh its timestamp
    fn update(&self, database_id: &str, fields: &RecordFields) -> RegistryResult<WriteOutcome>;

    /// Remove one record
    fn delete(&self, database_id: &str) -> RegistryResult<WriteOutcome>;
}
