//! Registry lens types
//!
//! Form state, user notices and the table rows of the listing view.

use crate::database::{MetadataRecord, RecordFields, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Timestamp layout of the listing view
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where the form controller currently is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FormState {
    /// Showing all records
    #[default]
    Listing,
    /// Filling in a new record
    Creating,
    /// Editing the record with this id
    Editing { database_id: String },
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// Message shown to the user after an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Edit form of one record, seeded from the listing
///
/// The id and timestamp are read-only; optional fields use an empty string
/// for "no value", the way a text input does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditForm {
    database_id: String,
    pub database_name: String,
    pub responsible_party: String,
    pub role: Role,
    pub source_path: String,
    last_updated: DateTime<Utc>,
}

impl EditForm {
    pub fn from_record(record: &MetadataRecord) -> Self {
        Self {
            database_id: record.database_id.clone(),
            database_name: record.database_name.clone(),
            responsible_party: record.responsible_party.clone().unwrap_or_default(),
            role: record.role,
            source_path: record.source_path.clone().unwrap_or_default(),
            last_updated: record.last_updated,
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Field values as submitted to the store
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            database_name: self.database_name.clone(),
            responsible_party: Some(self.responsible_party.clone()),
            role: self.role,
            source_path: Some(self.source_path.clone()),
        }
        .normalized()
    }
}

/// One row of the listing table, headed by the store's column names
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RecordTableItem {
    #[tabled(rename = "datenbank_id")]
    pub database_id: String,
    #[tabled(rename = "datenbank_name")]
    pub database_name: String,
    #[tabled(rename = "verantwortlicher_person")]
    pub responsible_party: String,
    #[tabled(rename = "rolle")]
    pub role: String,
    #[tabled(rename = "pfad_quellen")]
    pub source_path: String,
    #[tabled(rename = "letztes_update")]
    pub last_updated: String,
}

impl From<&MetadataRecord> for RecordTableItem {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            database_id: record.database_id.clone(),
            database_name: record.database_name.clone(),
            responsible_party: record.responsible_party.clone().unwrap_or_default(),
            role: record.role.label().to_string(),
            source_path: record.source_path.clone().unwrap_or_default(),
            last_updated: record.last_updated.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// One line of the edit form view
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct FormFieldItem {
    pub field: String,
    pub value: String,
    pub editable: String,
}

impl FormFieldItem {
    fn new(field: &str, value: impl Into<String>, editable: bool) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
            editable: if editable { "yes" } else { "no" }.to_string(),
        }
    }

    /// Lines of a form, id first
    pub fn from_form(form: &EditForm) -> Vec<FormFieldItem> {
        vec![
            Self::new("datenbank_id", form.database_id(), false),
            Self::new("datenbank_name", form.database_name.as_str(), true),
            Self::new(
                "verantwortlicher_person",
                form.responsible_party.as_str(),
                true,
            ),
            Self::new("rolle", form.role.label(), true),
            Self::new("pfad_quellen", form.source_path.as_str(), true),
            Self::new(
                "letztes_update",
                form.last_updated().format(TIMESTAMP_FORMAT).to_string(),
                false,
            ),
        ]
    }
}
