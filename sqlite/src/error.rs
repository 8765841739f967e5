//! Error types for SQLite migration operations.
//!
//! Only run-level failures are errors. A table whose generated statement is
//! rejected is reported as [`TableOutcome::Failed`](crate::TableOutcome::Failed)
//! and the run carries on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a migration or verification run.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The source database file does not exist.
    #[error("source database not found: {}", .0.display())]
    MissingSource(PathBuf),

    /// The destination database file does not exist (verification only).
    #[error("destination database not found: {}", .0.display())]
    MissingDestination(PathBuf),

    /// Source and destination name the same file.
    #[error("source and destination are the same file: {}", .0.display())]
    SameFile(PathBuf),

    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// File I/O failure, e.g. removing the old destination.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// An identifier could not be turned into SQL.
    #[error("statement error: {0}")]
    StatementError(#[from] schema_rename_core::StatementError),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
