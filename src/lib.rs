#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Metareg - a metadata registry for databases
//!
//! Metareg keeps one relational table (`metadaten_info`) describing databases:
//! id, name, responsible person, role, source path and the time of the last
//! change. It can be used as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | SQLite store, repositories, configuration | `rusqlite`, `config` |
//! | `mssql` | SQL Server store | `tiberius`, `tokio` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `lens` | Form controller and listing view | `display` |
//! | `cli` | The `metareg` binary | All above + `clap` |
//!
//! ## Choosing Features
//!
//! ```toml
//! # Library use against a local SQLite store
//! metareg = { version = "0.1", default-features = false, features = ["lens"] }
//!
//! # Default (CLI binary, SQL Server and SQLite)
//! metareg = "0.1"
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: storage (always available)
//!   - `core`: SQLite connection management and schema definitions
//!   - `registry`: record types and the SQLite / SQL Server repositories
//!   - `provider`: connection provider and shared store handle
//!
//! - **[`lens`]**: form controller and output formatting (feature `lens`)
//!
//! - **[`config`]**: configuration from file, `.env` and environment
//!
//! - **[`error`]**: the `RegistryError` taxonomy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use metareg::database::{ConnectionProvider, MetadataRepository, RecordDraft, RecordFields, Role};
//! use metareg::MetaregConfig;
//!
//! let config = MetaregConfig::new(&None)?;
//! let provider = ConnectionProvider::new(config.store_settings()?);
//! let store = provider.handle()?;
//!
//! let draft = RecordDraft::new(
//!     "db1",
//!     RecordFields::new("Sales DB").with_person("Alice").with_role(Role::Analyst),
//! );
//! let record = store.create(&draft)?;
//! println!("registered {} at {}", record.database_id, record.last_updated);
//!
//! provider.close()?;
//! ```

pub mod config;
pub mod database;
pub mod error;

// Lens module - feature gated
#[cfg(feature = "lens")]
pub mod lens;

// =============================================================================
// Configuration and errors (always available)
// =============================================================================

pub use config::{MetaregConfig, SqlServerSettings, StoreDriver, StoreSettings};
pub use error::{RegistryError, RegistryResult, ValidationError};

// =============================================================================
// Database Module - Re-export commonly used types (always available)
// =============================================================================

// Core database types
pub use database::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

// Registry records and repositories
pub use database::{
    MetadataRecord, MetadataRepository, RecordDraft, RecordFields, Role,
    SqliteMetadataRepository, WriteOutcome,
};

// Store lifecycle
pub use database::{ConnectionProvider, StoreHandle};

// =============================================================================
// Lens Module - Feature-gated exports
// =============================================================================

#[cfg(feature = "lens")]
pub use lens::registry::{FormState, Notice, NoticeLevel, RegistryLens};

#[cfg(feature = "lens")]
pub use lens::utils::OutputFormat;
