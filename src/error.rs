//! Error types for the metadata registry
//!
//! Every store operation returns a [`RegistryError`]. The variants follow the
//! failure classes a caller has to tell apart: configuration problems are fatal
//! at startup, read failures mean "no data available", write failures carry the
//! store's message, and duplicate keys are reported on their own.

use thiserror::Error;

/// Result alias used throughout the crate
pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A required setting is missing or malformed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The store could not be reached
    #[error("unable to connect to the store: {0}")]
    Connection(String),

    /// Listing the records failed
    #[error("unable to load metadata records: {0}")]
    StoreRead(String),

    /// A create, update or delete statement failed
    #[error("unable to write metadata record: {0}")]
    StoreWrite(String),

    /// A record with this `datenbank_id` already exists
    #[error("a database with id '{0}' already exists")]
    DuplicateKey(String),

    /// Required form fields are missing
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The id is not part of the current listing
    #[error("no database with id '{0}'")]
    NotFound(String),

    /// Output could not be produced
    #[error("unable to render output: {0}")]
    Render(String),
}

impl RegistryError {
    /// Short machine-readable code, used in JSON output and log events
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Connection(_) => "connection_error",
            Self::StoreRead(_) => "store_read_error",
            Self::StoreWrite(_) => "store_write_error",
            Self::DuplicateKey(_) => "duplicate_key_error",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Render(_) => "render_error",
        }
    }
}

/// Rejected form input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("database id and database name are required")]
    MissingIdAndName,
    #[error("database id is required")]
    MissingId,
    #[error("database name is required")]
    MissingName,
    #[error("unknown role '{0}', expected one of: Admin, Data Engineer, Analyst, Viewer, Manager")]
    UnknownRole(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RegistryError::Configuration("host".into()).code(),
            "configuration_error"
        );
        assert_eq!(
            RegistryError::DuplicateKey("db1".into()).code(),
            "duplicate_key_error"
        );
        assert_eq!(
            RegistryError::from(ValidationError::MissingId).code(),
            "validation_error"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RegistryError::DuplicateKey("db1".into()).to_string(),
            "a database with id 'db1' already exists"
        );
        assert_eq!(
            RegistryError::from(ValidationError::MissingIdAndName).to_string(),
            "database id and database name are required"
        );
        assert_eq!(
            RegistryError::NotFound("x".into()).to_string(),
            "no database with id 'x'"
        );
    }
}
