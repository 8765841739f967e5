//! SQLite backend for schema-rename.
//!
//! Copies every mapped table of a source database into a freshly created
//! destination database, renaming tables and columns through a
//! [`RenameMap`](schema_rename_core::RenameMap) while keeping column types,
//! `NOT NULL`, primary keys, defaults, and row values unchanged.
//!
//! # Architecture
//!
//! - **`introspect`**: table discovery and `PRAGMA table_info` reading
//! - **`plan`**: per-table generated statements, usable as a dry run
//! - **`migrator`**: preflight, per-table copy loop, single commit
//! - **`report`**: per-table outcomes and run counters
//! - **`verify`**: row count and content digest comparison after a run
//!
//! # Quick start
//!
//! ```no_run
//! use schema_rename_core::RenameMap;
//! use schema_rename_sqlite::{TableOutcome, migrate_file, verify_files};
//!
//! let map = RenameMap::builtin().clone();
//! let report = migrate_file("voter_identity.db", "voter_list_readable.db", map.clone()).unwrap();
//! for table in &report.tables {
//!     if let TableOutcome::Failed { error, .. } = &table.outcome {
//!         eprintln!("{}: {error}", table.source);
//!     }
//! }
//!
//! let check = verify_files("voter_identity.db", "voter_list_readable.db", &map).unwrap();
//! assert!(check.is_match());
//! ```

mod error;
mod introspect;
mod migrator;
mod plan;
mod report;
mod verify;

pub use error::{Result, SqliteError};
pub use introspect::{list_tables, row_count, table_columns, table_exists};
pub use migrator::{Migrator, migrate_file};
pub use plan::{PlannedTable, TablePlan, plan_tables};
pub use report::{MigrationReport, TableOutcome, TableReport};
pub use verify::{
    TableVerification, VerifyOutcome, VerifyReport, table_digest, verify, verify_files,
};
