//! Lens module
//!
//! This module provides the "lens" over the registry store: the form
//! controller that combines the CRUD contract with output formatting. The
//! lens is independent of the surface driving it (CLI, or any caller that
//! builds the args structs through serde).
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (`RegistryLens`) - the entry point for all operations
//! - **Args structs** - input of the create and edit forms
//! - **Output types** - form state, notices and table rows
//!
//! # Usage
//!
//! ```rust,ignore
//! use metareg::database::StoreHandle;
//! use metareg::lens::registry::{CreateArgs, RegistryLens};
//! use metareg::lens::utils::OutputFormat;
//!
//! let store = StoreHandle::in_memory()?;
//! let mut lens = RegistryLens::new(&store);
//!
//! lens.begin_create();
//! let notice = lens.submit_create(&CreateArgs::new("db1", "Sales DB").to_draft());
//! println!("{}", notice);
//! println!("{}", lens.format_listing(OutputFormat::Table)?);
//! ```

pub mod registry;
pub mod utils;
