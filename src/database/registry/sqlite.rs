//! SQLite implementation of the registry repository

use super::record::{MetadataRecord, RecordDraft, RecordFields, Role, WriteOutcome};
use super::MetadataRepository;
use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

const SELECT_ALL_SQL: &str = "SELECT
    datenbank_id,
    datenbank_name,
    verantwortlicher_person,
    rolle,
    pfad_quellen,
    letztes_update
FROM metadaten_info
ORDER BY rowid";

/// Repository over the `metadaten_info` table of a SQLite store
pub struct SqliteMetadataRepository<'a> {
    conn: &'a Connection,
}

/// Row as stored, before the role label is read
struct StoredRow {
    database_id: String,
    database_name: String,
    responsible_party: Option<String>,
    role: String,
    source_path: Option<String>,
    last_updated: DateTime<Utc>,
}

impl<'a> SqliteMetadataRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl MetadataRepository for SqliteMetadataRepository<'_> {
    fn list_all(&self) -> RegistryResult<Vec<MetadataRecord>> {
        let mut stmt = self
            .conn
            .prepare(SELECT_ALL_SQL)
            .map_err(|e| RegistryError::StoreRead(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoredRow {
                    database_id: row.get(0)?,
                    database_name: row.get(1)?,
                    responsible_party: row.get(2)?,
                    role: row.get(3)?,
                    source_path: row.get(4)?,
                    last_updated: row.get(5)?,
                })
            })
            .map_err(|e| RegistryError::StoreRead(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| RegistryError::StoreRead(e.to_string()))?;
            records.push(stored_row_to_record(row));
        }

        debug!(count = records.len(), "listed metadata records");
        Ok(records)
    }

    fn create(&self, draft: &RecordDraft) -> RegistryResult<MetadataRecord> {
        draft.validate()?;
        let draft = draft.normalized();
        let now = Utc::now();

        self.conn
            .execute(
                "INSERT INTO metadaten_info (
                    datenbank_id,
                    datenbank_name,
                    verantwortlicher_person,
                    rolle,
                    pfad_quellen,
                    letztes_update
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    draft.database_id.as_str(),
                    draft.fields.database_name.as_str(),
                    draft.fields.responsible_party.as_deref(),
                    draft.fields.role.label(),
                    draft.fields.source_path.as_deref(),
                    now,
                ],
            )
            .map_err(|e| classify_write_error(&draft.database_id, e))?;

        info!(database_id = %draft.database_id, "created metadata record");
        Ok(MetadataRecord::from_parts(
            draft.database_id,
            draft.fields,
            now,
        ))
    }

    fn update(&self, database_id: &str, fields: &RecordFields) -> RegistryResult<WriteOutcome> {
        fields.validate()?;
        let fields = fields.normalized();
        let database_id = database_id.trim();

        let changed = self
            .conn
            .execute(
                "UPDATE metadaten_info
                 SET
                    datenbank_name = ?1,
                    verantwortlicher_person = ?2,
                    rolle = ?3,
                    pfad_quellen = ?4,
                    letztes_update = ?5
                 WHERE datenbank_id = ?6",
                params![
                    fields.database_name.as_str(),
                    fields.responsible_party.as_deref(),
                    fields.role.label(),
                    fields.source_path.as_deref(),
                    Utc::now(),
                    database_id,
                ],
            )
            .map_err(|e| RegistryError::StoreWrite(e.to_string()))?;

        debug!(database_id, rows_affected = changed, "updated metadata record");
        Ok(WriteOutcome::new(changed as u64))
    }

    fn delete(&self, database_id: &str) -> RegistryResult<WriteOutcome> {
        let database_id = database_id.trim();
        let changed = self
            .conn
            .execute(
                "DELETE FROM metadaten_info WHERE datenbank_id = ?1",
                [database_id],
            )
            .map_err(|e| RegistryError::StoreWrite(e.to_string()))?;

        debug!(database_id, rows_affected = changed, "deleted metadata record");
        Ok(WriteOutcome::new(changed as u64))
    }
}

fn stored_row_to_record(row: StoredRow) -> MetadataRecord {
    let role = Role::from_stored(&row.role, &row.database_id);

    MetadataRecord {
        database_id: row.database_id,
        database_name: row.database_name,
        responsible_party: row.responsible_party,
        role,
        source_path: row.source_path,
        last_updated: row.last_updated,
    }
}

/// Primary key and unique violations become `DuplicateKey`
fn classify_write_error(database_id: &str, e: rusqlite::Error) -> RegistryError {
    if let rusqlite::Error::SqliteFailure(err, _) = &e {
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return RegistryError::DuplicateKey(database_id.to_string());
        }
    }
    RegistryError::StoreWrite(e.to_string())
}
