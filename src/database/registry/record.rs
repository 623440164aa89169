//! Metadata record types
//!
//! A record describes one registered database. The key (`datenbank_id`) is
//! fixed at creation time; everything else is overwritten as a whole on update.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Name of the registry table
pub const METADATA_TABLE: &str = "metadaten_info";

/// Column names of the registry table, in listing order
pub const METADATA_COLUMNS: [&str; 6] = [
    "datenbank_id",
    "datenbank_name",
    "verantwortlicher_person",
    "rolle",
    "pfad_quellen",
    "letztes_update",
];

/// Role of the responsible person
///
/// Descriptive metadata only, it grants nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Admin,
    #[serde(rename = "Data Engineer", alias = "DataEngineer")]
    DataEngineer,
    Analyst,
    Viewer,
    Manager,
}

impl Role {
    /// All roles in selection-list order
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::DataEngineer,
        Role::Analyst,
        Role::Viewer,
        Role::Manager,
    ];

    /// The value stored in the `rolle` column
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::DataEngineer => "Data Engineer",
            Role::Analyst => "Analyst",
            Role::Viewer => "Viewer",
            Role::Manager => "Manager",
        }
    }

    /// Parse a stored `rolle` value exactly
    pub fn from_label(label: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.label() == label)
    }

    /// Read a `rolle` value written by any client
    ///
    /// Exact labels map directly. Anything else is parsed leniently and falls
    /// back to the default role, so one odd row never hides the others.
    pub fn from_stored(value: &str, database_id: &str) -> Role {
        if let Some(role) = Self::from_label(value) {
            return role;
        }
        match value.parse::<Role>() {
            Ok(role) => {
                warn!(database_id, value, role = %role, "non-canonical role value");
                role
            }
            Err(_) => {
                let role = Role::default();
                warn!(database_id, value, role = %role, "unknown role value, using default");
                role
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "admin" => Ok(Role::Admin),
            "dataengineer" => Ok(Role::DataEngineer),
            "analyst" => Ok(Role::Analyst),
            "viewer" => Ok(Role::Viewer),
            "manager" => Ok(Role::Manager),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}

/// The overwritable part of a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub database_name: String,
    pub responsible_party: Option<String>,
    pub role: Role,
    pub source_path: Option<String>,
}

impl RecordFields {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            ..Default::default()
        }
    }

    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.responsible_party = Some(person.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Trim the name and turn blank optional fields into `None`
    pub fn normalized(&self) -> RecordFields {
        RecordFields {
            database_name: self.database_name.trim().to_string(),
            responsible_party: blank_to_none(self.responsible_party.as_deref()),
            role: self.role,
            source_path: blank_to_none(self.source_path.as_deref()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.database_name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(())
    }
}

/// Input of a create call: the key plus the initial field values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub database_id: String,
    #[serde(flatten)]
    pub fields: RecordFields,
}

impl RecordDraft {
    pub fn new(database_id: impl Into<String>, fields: RecordFields) -> Self {
        Self {
            database_id: database_id.into(),
            fields,
        }
    }

    /// Id and name must both be non-blank
    pub fn validate(&self) -> Result<(), ValidationError> {
        let id_blank = self.database_id.trim().is_empty();
        let name_blank = self.fields.database_name.trim().is_empty();
        match (id_blank, name_blank) {
            (true, true) => Err(ValidationError::MissingIdAndName),
            (true, false) => Err(ValidationError::MissingId),
            (false, true) => Err(ValidationError::MissingName),
            (false, false) => Ok(()),
        }
    }

    pub fn normalized(&self) -> RecordDraft {
        RecordDraft {
            database_id: self.database_id.trim().to_string(),
            fields: self.fields.normalized(),
        }
    }
}

/// One row of `metadaten_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub database_id: String,
    pub database_name: String,
    pub responsible_party: Option<String>,
    pub role: Role,
    pub source_path: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl MetadataRecord {
    pub(crate) fn from_parts(
        database_id: String,
        fields: RecordFields,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            database_id,
            database_name: fields.database_name,
            responsible_party: fields.responsible_party,
            role: fields.role,
            source_path: fields.source_path,
            last_updated,
        }
    }

    /// Current values of the overwritable fields
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            database_name: self.database_name.clone(),
            responsible_party: self.responsible_party.clone(),
            role: self.role,
            source_path: self.source_path.clone(),
        }
    }

    /// Whether this record holds the draft's id and values, ignoring the timestamp
    pub fn matches(&self, draft: &RecordDraft) -> bool {
        let draft = draft.normalized();
        self.database_id == draft.database_id && self.fields() == draft.fields
    }
}

/// Rows touched by an update or delete
///
/// Zero means no record carried the given id. That is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub rows_affected: u64,
}

impl WriteOutcome {
    pub fn new(rows_affected: u64) -> Self {
        Self { rows_affected }
    }

    pub fn is_noop(&self) -> bool {
        self.rows_affected == 0
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
