//! SQL Server implementation of the registry repository
//!
//! The store client (tiberius) is asynchronous while the registry is strictly
//! request/response, so [`MssqlConn`] owns a current-thread tokio runtime and
//! blocks on every statement.

use super::record::{MetadataRecord, RecordDraft, RecordFields, Role, WriteOutcome};
use super::MetadataRepository;
use crate::config::SqlServerSettings;
use crate::error::{RegistryError, RegistryResult};
use chrono::{NaiveDateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, Row};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

/// Violation of PRIMARY KEY constraint
const MSSQL_PRIMARY_KEY_VIOLATION: u32 = 2627;
/// Cannot insert duplicate key row (unique index)
const MSSQL_UNIQUE_INDEX_VIOLATION: u32 = 2601;

const SELECT_ALL_SQL: &str = "SELECT
    datenbank_id,
    datenbank_name,
    verantwortlicher_person,
    rolle,
    pfad_quellen,
    letztes_update
FROM metadaten_info
ORDER BY datenbank_id";

type SqlClient = Client<Compat<TcpStream>>;

/// An authenticated SQL Server session
pub struct MssqlConn {
    runtime: Runtime,
    client: Mutex<SqlClient>,
}

impl MssqlConn {
    /// Connect and authenticate, without retrying
    pub fn connect(settings: &SqlServerSettings) -> RegistryResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RegistryError::Connection(format!("failed to start runtime: {}", e)))?;

        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            "connecting to SQL Server"
        );
        let client = runtime.block_on(connect_client(settings))?;

        Ok(Self {
            runtime,
            client: Mutex::new(client),
        })
    }

    fn lock(&self) -> RegistryResult<MutexGuard<'_, SqlClient>> {
        self.client
            .lock()
            .map_err(|_| RegistryError::Connection("SQL Server session lock poisoned".to_string()))
    }
}

async fn connect_client(settings: &SqlServerSettings) -> RegistryResult<SqlClient> {
    let mut config = Config::new();
    config.host(&settings.host);
    config.port(settings.port);
    config.database(&settings.database);
    config.authentication(AuthMethod::sql_server(&settings.user, &settings.password));
    config.encryption(EncryptionLevel::Required);
    if settings.trust_server_certificate {
        config.trust_cert();
    }

    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(|e| RegistryError::Connection(e.to_string()))?;
    tcp.set_nodelay(true)
        .map_err(|e| RegistryError::Connection(e.to_string()))?;

    Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| RegistryError::Connection(e.to_string()))
}

/// Repository over the `metadaten_info` table of a SQL Server store
pub struct MssqlMetadataRepository<'a> {
    conn: &'a MssqlConn,
}

impl<'a> MssqlMetadataRepository<'a> {
    pub fn new(conn: &'a MssqlConn) -> Self {
        Self { conn }
    }
}

impl MetadataRepository for MssqlMetadataRepository<'_> {
    fn list_all(&self) -> RegistryResult<Vec<MetadataRecord>> {
        let records = self.conn.runtime.block_on(async {
            let mut client = self.conn.lock()?;
            let rows = client
                .query(SELECT_ALL_SQL, &[])
                .await
                .map_err(|e| RegistryError::StoreRead(e.to_string()))?
                .into_first_result()
                .await
                .map_err(|e| RegistryError::StoreRead(e.to_string()))?;

            rows.iter()
                .map(row_to_record)
                .collect::<RegistryResult<Vec<_>>>()
        })?;

        debug!(count = records.len(), "listed metadata records");
        Ok(records)
    }

    fn create(&self, draft: &RecordDraft) -> RegistryResult<MetadataRecord> {
        draft.validate()?;
        let draft = draft.normalized();
        let now = Utc::now();
        let role = draft.fields.role.label().to_string();
        let stamp = now.naive_utc();

        self.conn.runtime.block_on(async {
            let mut client = self.conn.lock()?;
            client
                .execute(
                    "INSERT INTO metadaten_info (
                        datenbank_id,
                        datenbank_name,
                        verantwortlicher_person,
                        rolle,
                        pfad_quellen,
                        letztes_update
                    ) VALUES (@P1, @P2, @P3, @P4, @P5, @P6)",
                    &[
                        &draft.database_id,
                        &draft.fields.database_name,
                        &draft.fields.responsible_party,
                        &role,
                        &draft.fields.source_path,
                        &stamp,
                    ],
                )
                .await
                .map_err(|e| classify_write_error(&draft.database_id, e))
        })?;

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
        let database_id = database_id.trim().to_string();
        let role = fields.role.label().to_string();
        let stamp = Utc::now().naive_utc();

        let changed = self.conn.runtime.block_on(async {
            let mut client = self.conn.lock()?;
            let result = client
                .execute(
                    "UPDATE metadaten_info
                     SET
                        datenbank_name = @P1,
                        verantwortlicher_person = @P2,
                        rolle = @P3,
                        pfad_quellen = @P4,
                        letztes_update = @P5
                     WHERE datenbank_id = @P6",
                    &[
                        &fields.database_name,
                        &fields.responsible_party,
                        &role,
                        &fields.source_path,
                        &stamp,
                        &database_id,
                    ],
                )
                .await
                .map_err(|e| RegistryError::StoreWrite(e.to_string()))?;
            Ok::<u64, RegistryError>(result.rows_affected().iter().sum())
        })?;

        debug!(database_id = %database_id, rows_affected = changed, "updated metadata record");
        Ok(WriteOutcome::new(changed))
    }

    fn delete(&self, database_id: &str) -> RegistryResult<WriteOutcome> {
        let database_id = database_id.trim().to_string();

        let changed = self.conn.runtime.block_on(async {
            let mut client = self.conn.lock()?;
            let result = client
                .execute(
                    "DELETE FROM metadaten_info WHERE datenbank_id = @P1",
                    &[&database_id],
                )
                .await
                .map_err(|e| RegistryError::StoreWrite(e.to_string()))?;
            Ok::<u64, RegistryError>(result.rows_affected().iter().sum())
        })?;

        debug!(database_id = %database_id, rows_affected = changed, "deleted metadata record");
        Ok(WriteOutcome::new(changed))
    }
}

fn row_to_record(row: &Row) -> RegistryResult<MetadataRecord> {
    let database_id = required_text(row, "datenbank_id")?;
    let role = Role::from_stored(&required_text(row, "rolle")?, &database_id);

    let last_updated = row
        .try_get::<NaiveDateTime, _>("letztes_update")
        .map_err(|e| RegistryError::StoreRead(e.to_string()))?
        .ok_or_else(|| {
            RegistryError::StoreRead(format!(
                "letztes_update is NULL for datenbank_id `{}`",
                database_id
            ))
        })?
        .and_utc();

    Ok(MetadataRecord {
        database_name: required_text(row, "datenbank_name")?,
        responsible_party: optional_text(row, "verantwortlicher_person")?,
        role,
        source_path: optional_text(row, "pfad_quellen")?,
        last_updated,
        database_id,
    })
}

fn optional_text(row: &Row, column: &str) -> RegistryResult<Option<String>> {
    row.try_get::<&str, _>(column)
        .map(|value| value.map(str::to_string))
        .map_err(|e| RegistryError::StoreRead(format!("column {}: {}", column, e)))
}

fn required_text(row: &Row, column: &str) -> RegistryResult<String> {
    optional_text(row, column)?
        .ok_or_else(|| RegistryError::StoreRead(format!("column {} is NULL", column)))
}

/// Primary key and unique index violations become `DuplicateKey`
fn classify_write_error(database_id: &str, e: tiberius::error::Error) -> RegistryError {
    match &e {
        tiberius::error::Error::Server(token) => classify_server_code(database_id, token.code())
            .unwrap_or_else(|| RegistryError::StoreWrite(e.to_string())),
        _ => RegistryError::StoreWrite(e.to_string()),
    }
}

fn classify_server_code(database_id: &str, code: u32) -> Option<RegistryError> {
    match code {
        MSSQL_PRIMARY_KEY_VIOLATION | MSSQL_UNIQUE_INDEX_VIOLATION => {
            Some(RegistryError::DuplicateKey(database_id.to_string()))
        }
        _ => None,
    }
}
