//! Database module
//!
//! This module provides all storage functionality for metareg, organized into:
//!
//! - **core**: SQLite infrastructure (connections, schema management)
//! - **registry**: the `metadaten_info` repositories (SQLite, SQL Server)
//! - **provider**: turns configuration into a shared store handle
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # SQLite schema definitions and management
//! │
//! ├── registry/       # Record storage
//! │   ├── record      # MetadataRecord, Role, drafts and write outcomes
//! │   ├── sqlite      # Local store
//! │   └── mssql       # SQL Server store (feature `mssql`)
//! │
//! └── provider        # ConnectionProvider and StoreHandle
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use metareg::database::{ConnectionProvider, MetadataRepository};
//! use metareg::MetaregConfig;
//!
//! let config = MetaregConfig::new(&None)?;
//! let provider = ConnectionProvider::new(config.store_settings()?);
//!
//! let store = provider.handle()?;
//! for record in store.list_all()? {
//!     println!("{} {}", record.database_id, record.database_name);
//! }
//!
//! provider.close()?;
//! ```

pub mod core;
pub mod provider;
pub mod registry;

// SQLite connection and schema management
pub use core::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

// Registry repositories and record types
pub use registry::{
    MetadataRecord, MetadataRepository, RecordDraft, RecordFields, Role,
    SqliteMetadataRepository, WriteOutcome, METADATA_COLUMNS, METADATA_TABLE,
};

#[cfg(feature = "mssql")]
pub use registry::{MssqlConn, MssqlMetadataRepository};

// Store handle lifecycle
pub use provider::{ConnectionProvider, StoreHandle};
