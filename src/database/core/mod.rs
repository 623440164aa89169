//! Core database infrastructure
//!
//! This module provides the SQLite foundation of the local store:
//! - `DatabaseConn`: SQLite connection wrapper with configuration
//! - `SchemaManager`: Schema initialization and version checks
//! - `SchemaStatus`: Schema state enumeration

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};
