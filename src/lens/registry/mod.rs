//! Registry lens
//!
//! Form controller over a [`MetadataRepository`]. It keeps the last listing
//! as a snapshot, moves between listing, creating and editing, and turns
//! every store outcome into a [`Notice`] instead of an error.

pub mod args;
pub mod types;

pub use args::{CreateArgs, EditArgs};
pub use types::{
    EditForm, FormFieldItem, FormState, Notice, NoticeLevel, RecordTableItem, TIMESTAMP_FORMAT,
};

use crate::database::{MetadataRecord, MetadataRepository, RecordDraft, METADATA_COLUMNS};
use crate::error::{RegistryError, RegistryResult};
use crate::lens::utils::{psv_field, to_json_list, to_json_value, OutputFormat};
use tabled::settings::Style;
use tabled::Table;
use tracing::{debug, warn};

/// Shown when the listing cannot be loaded
pub const NO_DATA_MESSAGE: &str = "no data available or connection failed";

/// Form controller for the metadata registry
///
/// This lens provides the operations behind every user surface:
/// - Listing all records and selecting one for editing
/// - Creating, updating and deleting records
/// - Formatting listings and forms for output
pub struct RegistryLens<'a> {
    store: &'a dyn MetadataRepository,
    state: FormState,
    snapshot: Vec<MetadataRecord>,
    notices: Vec<Notice>,
}

impl<'a> RegistryLens<'a> {
    /// Create a new lens in the listing state with an empty snapshot
    ///
    /// Call [`refresh`](Self::refresh) to load the listing.
    pub fn new(store: &'a dyn MetadataRepository) -> Self {
        Self {
            store,
            state: FormState::Listing,
            snapshot: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Records of the last successful listing
    pub fn records(&self) -> &[MetadataRecord] {
        &self.snapshot
    }

    /// Drain the notices produced since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Re-read the whole table into the snapshot
    ///
    /// A failed read empties the snapshot and leaves an info notice.
    pub fn refresh(&mut self) -> Option<Notice> {
        match self.store.list_all() {
            Ok(records) => {
                debug!(count = records.len(), "refreshed listing");
                self.snapshot = records;
                None
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "listing failed");
                self.snapshot.clear();
                Some(self.notify(Notice::info(NO_DATA_MESSAGE)))
            }
        }
    }

    /// Start a new record with an empty form
    pub fn begin_create(&mut self) -> RecordDraft {
        self.state = FormState::Creating;
        RecordDraft::default()
    }

    /// Submit the create form
    ///
    /// Missing id or name keeps the form open with a warning and never
    /// reaches the store. A store failure keeps the form open as well.
    pub fn submit_create(&mut self, draft: &RecordDraft) -> Notice {
        self.state = FormState::Creating;

        if let Err(e) = draft.validate() {
            return self.notify(Notice::warning(e.to_string()));
        }

        match self.store.create(draft) {
            Ok(record) => {
                self.state = FormState::Listing;
                let notice = self.notify(Notice::success(format!(
                    "database '{}' registered",
                    record.database_id
                )));
                self.refresh();
                notice
            }
            Err(e @ RegistryError::DuplicateKey(_)) => self.notify(Notice::error(e.to_string())),
            Err(e) => {
                warn!(error = %e, code = e.code(), "create failed");
                self.notify(Notice::error(format!("failed to register database: {}", e)))
            }
        }
    }

    /// Open the edit form of a record from the current snapshot
    ///
    /// An id that is not part of the snapshot leaves the state unchanged.
    pub fn select(&mut self, database_id: &str) -> RegistryResult<EditForm> {
        let database_id = database_id.trim();
        let record = self
            .snapshot
            .iter()
            .find(|r| r.database_id == database_id)
            .ok_or_else(|| RegistryError::NotFound(database_id.to_string()))?;

        let form = EditForm::from_record(record);
        self.state = FormState::Editing {
            database_id: record.database_id.clone(),
        };
        Ok(form)
    }

    /// Submit the edit form of the selected record
    ///
    /// The selected id is the key; the form cannot change it. Apart from a
    /// blank name, every outcome returns to the listing and re-fetches it.
    pub fn submit_update(&mut self, form: &EditForm) -> Notice {
        let database_id = match self.selected_id() {
            Some(id) => id,
            None => return self.notify(Notice::error("no record selected")),
        };

        let fields = form.fields();
        if let Err(e) = fields.validate() {
            return self.notify(Notice::warning(e.to_string()));
        }

        let notice = match self.store.update(&database_id, &fields) {
            Ok(outcome) if outcome.is_noop() => Notice::warning(format!(
                "no record with id '{}' (nothing changed)",
                database_id
            )),
            Ok(_) => Notice::success(format!("database '{}' updated", database_id)),
            Err(e) => {
                warn!(error = %e, code = e.code(), "update failed");
                Notice::error(format!("failed to update database: {}", e))
            }
        };
        self.finish_edit(notice)
    }

    /// Delete the selected record, then return to the listing
    pub fn delete_selected(&mut self) -> Notice {
        let database_id = match self.selected_id() {
            Some(id) => id,
            None => return self.notify(Notice::error("no record selected")),
        };

        let notice = match self.store.delete(&database_id) {
            Ok(outcome) if outcome.is_noop() => Notice::warning(format!(
                "no record with id '{}' (nothing changed)",
                database_id
            )),
            Ok(_) => Notice::success(format!("database '{}' deleted", database_id)),
            Err(e) => {
                warn!(error = %e, code = e.code(), "delete failed");
                Notice::error(format!("failed to delete database: {}", e))
            }
        };
        self.finish_edit(notice)
    }

    /// Leave any form and go back to the listing
    pub fn cancel(&mut self) {
        self.state = FormState::Listing;
    }

    fn selected_id(&self) -> Option<String> {
        match &self.state {
            FormState::Editing { database_id } => Some(database_id.clone()),
            _ => None,
        }
    }

    fn finish_edit(&mut self, notice: Notice) -> Notice {
        self.state = FormState::Listing;
        let notice = self.notify(notice);
        self.refresh();
        notice
    }

    fn notify(&mut self, notice: Notice) -> Notice {
        self.notices.push(notice.clone());
        notice
    }

    /// Format the snapshot as a listing
    pub fn format_listing(&self, format: OutputFormat) -> RegistryResult<String> {
        format_records(&self.snapshot, format)
    }
}

/// Format records for output
pub fn format_records(records: &[MetadataRecord], format: OutputFormat) -> RegistryResult<String> {
    match format {
        OutputFormat::Json | OutputFormat::JsonPretty | OutputFormat::JsonLine => {
            to_json_list(records, format)
        }
        OutputFormat::Psv => {
            let mut output = METADATA_COLUMNS.join("|");
            output.push('\n');
            for item in records.iter().map(RecordTableItem::from) {
                output.push_str(&format!(
                    "{}|{}|{}|{}|{}|{}\n",
                    psv_field(&item.database_id),
                    psv_field(&item.database_name),
                    psv_field(&item.responsible_party),
                    item.role,
                    psv_field(&item.source_path),
                    item.last_updated
                ));
            }
            Ok(output.trim_end().to_string())
        }
        OutputFormat::Table => {
            let items: Vec<RecordTableItem> = records.iter().map(Into::into).collect();
            Ok(Table::new(items).with(Style::rounded()).to_string())
        }
        OutputFormat::Markdown => {
            let items: Vec<RecordTableItem> = records.iter().map(Into::into).collect();
            Ok(Table::new(items).with(Style::markdown()).to_string())
        }
    }
}

/// Format an edit form for output
pub fn format_form(form: &EditForm, format: OutputFormat) -> RegistryResult<String> {
    match format {
        OutputFormat::Json | OutputFormat::JsonPretty | OutputFormat::JsonLine => {
            to_json_value(form, format)
        }
        OutputFormat::Psv => {
            let mut output = String::from("field|value|editable\n");
            for item in FormFieldItem::from_form(form) {
                output.push_str(&format!(
                    "{}|{}|{}\n",
                    item.field,
                    psv_field(&item.value),
                    item.editable
                ));
            }
            Ok(output.trim_end().to_string())
        }
        OutputFormat::Table => Ok(Table::new(FormFieldItem::from_form(form))
            .with(Style::rounded())
            .to_string()),
        OutputFormat::Markdown => Ok(Table::new(FormFieldItem::from_form(form))
            .with(Style::markdown())
            .to_string()),
    }
}
