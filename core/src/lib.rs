//! Core types for renaming an SQLite schema while copying it.
//!
//! This crate holds everything that does not touch a database:
//!
//! - [`RenameMap`]: table mapping plus per-table column mappings, with the
//!   built-in voter identity mapping available through
//!   [`RenameMap::builtin`].
//! - [`ColumnDescriptor`] and [`DefaultValue`]: introspected column metadata
//!   with defaults classified as text, number, keyword, or expression.
//! - [`CreateTable`], [`select_all`], [`insert_row`]: statement building
//!   with identifier quoting.
//! - [`validate_map`]: structural checks on a rename map.
//!
//! # Example
//!
//! ```
//! use schema_rename_core::*;
//!
//! let map = RenameMap::builtin();
//! let columns = [
//!     ColumnDescriptor::new("c1", "INTEGER").primary_key(1),
//!     ColumnDescriptor::new("c2", "TEXT"),
//! ];
//!
//! let target = map.table_name("t1").unwrap();
//! let sql = CreateTable::new(target)
//!     .columns(columns.iter().map(|c| ColumnDef::renamed(map, "t1", c)))
//!     .build()
//!     .unwrap();
//! assert!(sql.starts_with("CREATE TABLE \"province\""));
//! assert!(sql.contains("\"name\" TEXT"));
//! ```

mod column;
mod mapping;
mod statement;
mod validate;

pub use column::{ColumnDescriptor, DefaultValue};
pub use mapping::RenameMap;
pub use statement::{
    ColumnDef, CreateTable, Result, StatementError, insert_row, quote_ident, select_all,
};
pub use validate::{MappingError, validate_map};
