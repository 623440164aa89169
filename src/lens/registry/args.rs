//! Registry lens arguments
//!
//! Input of the create and edit forms. The same structs back the CLI (with
//! clap derives when the `cli` feature is enabled) and any serde-driven
//! caller.

use serde::{Deserialize, Serialize};

use super::types::EditForm;
use crate::database::{RecordDraft, RecordFields, Role};

/// Arguments for registering a new database
///
/// Id and name default to empty so that missing values reach the form
/// controller, which answers with a warning instead of a usage error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct CreateArgs {
    /// Database id (datenbank_id), fixed once created
    #[cfg_attr(feature = "cli", clap(long, default_value = ""))]
    #[serde(default)]
    pub id: String,

    /// Database name (datenbank_name)
    #[cfg_attr(feature = "cli", clap(long, default_value = ""))]
    #[serde(default)]
    pub name: String,

    /// Responsible person (verantwortlicher_person)
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub person: Option<String>,

    /// Role: Admin, "Data Engineer", Analyst, Viewer or Manager
    #[cfg_attr(feature = "cli", clap(long, default_value_t = Role::Admin))]
    #[serde(default)]
    pub role: Role,

    /// Source path (pfad_quellen)
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub path: Option<String>,
}

impl CreateArgs {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_person(mut self, person: &str) -> Self {
        self.person = Some(person.to_string());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft::new(
            self.id.as_str(),
            RecordFields {
                database_name: self.name.clone(),
                responsible_party: self.person.clone(),
                role: self.role,
                source_path: self.path.clone(),
            },
        )
    }
}

/// Arguments for editing a registered database
///
/// Only the given fields change; the rest keep the values from the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct EditArgs {
    /// Database id of the record to edit
    #[cfg_attr(feature = "cli", clap(value_name = "ID"))]
    pub id: String,

    /// New database name
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub name: Option<String>,

    /// New responsible person
    #[cfg_attr(feature = "cli", clap(long, conflicts_with = "clear_person"))]
    #[serde(default)]
    pub person: Option<String>,

    /// New role
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub role: Option<Role>,

    /// New source path
    #[cfg_attr(feature = "cli", clap(long, conflicts_with = "clear_path"))]
    #[serde(default)]
    pub path: Option<String>,

    /// Remove the responsible person
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub clear_person: bool,

    /// Remove the source path
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub clear_path: bool,
}

impl EditArgs {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Overlay the given values on a pre-populated form
    pub fn apply(&self, form: &mut EditForm) {
        if let Some(name) = &self.name {
            form.database_name = name.clone();
        }
        if let Some(person) = &self.person {
            form.responsible_party = person.clone();
        }
        if self.clear_person {
            form.responsible_party.clear();
        }
        if let Some(role) = self.role {
            form.role = role;
        }
        if let Some(path) = &self.path {
            form.source_path = path.clone();
        }
        if self.clear_path {
            form.source_path.clear();
        }
    }

    /// Whether any field would change
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.person.is_some()
            || self.role.is_some()
            || self.path.is_some()
            || self.clear_person
            || self.clear_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MetadataRecord;
    use chrono::Utc;

    fn record() -> MetadataRecord {
        MetadataRecord {
            database_id: "db1".to_string(),
            database_name: "Sales DB".to_string(),
            responsible_party: Some("Alice".to_string()),
            role: Role::Analyst,
            source_path: Some("/data/sales".to_string()),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_create_args_to_draft() {
        let draft = CreateArgs::new("db1", "Sales DB")
            .with_person("Alice")
            .with_role(Role::Analyst)
            .with_path("/data/sales")
            .to_draft();
        assert_eq!(draft.database_id, "db1");
        assert_eq!(draft.fields.responsible_party.as_deref(), Some("Alice"));
        assert_eq!(draft.fields.role, Role::Analyst);
    }

    #[test]
    fn test_create_args_default_role() {
        assert_eq!(CreateArgs::new("db1", "Sales DB").role, Role::Admin);
    }

    #[test]
    fn test_edit_args_overlay_keeps_unset_fields() {
        let mut form = EditForm::from_record(&record());
        let args = EditArgs {
            name: Some("Sales DB v2".to_string()),
            role: Some(Role::Manager),
            ..EditArgs::new("db1")
        };
        assert!(args.has_changes());
        args.apply(&mut form);

        assert_eq!(form.database_name, "Sales DB v2");
        assert_eq!(form.role, Role::Manager);
        assert_eq!(form.responsible_party, "Alice");
        assert_eq!(form.source_path, "/data/sales");
        assert_eq!(form.database_id(), "db1");
    }

    #[test]
    fn test_edit_args_clear_optional_fields() {
        let mut form = EditForm::from_record(&record());
        let args = EditArgs {
            clear_person: true,
            clear_path: true,
            ..EditArgs::new("db1")
        };
        args.apply(&mut form);

        let fields = form.fields();
        assert_eq!(fields.responsible_party, None);
        assert_eq!(fields.source_path, None);
    }

    #[test]
    fn test_edit_args_deserialize_role_label() {
        let args: EditArgs =
            serde_json::from_str(r#"{"id": "db1", "role": "Data Engineer"}"#).unwrap();
        assert_eq!(args.role, Some(Role::DataEngineer));
        assert!(!args.clear_path);
    }
}
