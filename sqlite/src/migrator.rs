//! Copying a source database into a renamed destination database.
//!
//! A run is a fixed sequence: preflight, table discovery, one pass per table,
//! then a single commit. Each table is handled independently; a table whose
//! generated `CREATE TABLE` is rejected is recorded as failed and the run
//! moves on to the next one.
//!
//! # Example
//!
//! ```no_run
//! use schema_rename_core::RenameMap;
//! use schema_rename_sqlite::migrate_file;
//!
//! let report = migrate_file(
//!     "voter_identity.db",
//!     "voter_list_readable.db",
//!     RenameMap::builtin().clone(),
//! )
//! .unwrap();
//! println!("{} tables, {} rows", report.migrated(), report.rows_copied());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use schema_rename_core::RenameMap;
use tracing::{error, info, warn};

use crate::error::{Result, SqliteError};
use crate::introspect::{list_tables, table_columns};
use crate::plan::{PlannedTable, TablePlan, plan_tables};
use crate::report::{MigrationReport, TableOutcome, TableReport};

/// Runs a full file-to-file migration.
///
/// Equivalent to [`Migrator::open`], [`Migrator::run`], then
/// [`Migrator::close`].
///
/// # Errors
///
/// Returns [`SqliteError::MissingSource`] before touching the destination if
/// `source` does not exist. Row copy and commit failures are returned as
/// [`SqliteError::DatabaseError`].
pub fn migrate_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    map: RenameMap,
) -> Result<MigrationReport> {
    let mut migrator = Migrator::open(source, destination, map)?;
    let report = migrator.run()?;
    migrator.close()?;
    Ok(report)
}

/// Owns the source and destination connections for one run.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use schema_rename_core::RenameMap;
/// use schema_rename_sqlite::{Migrator, TableOutcome};
///
/// let source = Connection::open_in_memory().unwrap();
/// source
///     .execute_batch(
///         "CREATE TABLE t1 (c1 INTEGER PRIMARY KEY, c2 TEXT);
///          INSERT INTO t1 VALUES (1, 'Koshi'), (2, 'Madhesh');",
///     )
///     .unwrap();
/// let destination = Connection::open_in_memory().unwrap();
///
/// let mut migrator = Migrator::new(source, destination, RenameMap::builtin().clone());
/// let report = migrator.run().unwrap();
/// assert_eq!(report.table("t1").unwrap().outcome, TableOutcome::Copied { rows: 2 });
///
/// let name: String = migrator
///     .destination()
///     .query_row("SELECT name FROM province WHERE id = 2", [], |r| r.get(0))
///     .unwrap();
/// assert_eq!(name, "Madhesh");
/// ```
pub struct Migrator {
    source: Connection,
    destination: Connection,
    map: RenameMap,
    source_path: Option<PathBuf>,
    destination_path: Option<PathBuf>,
}

impl Migrator {
    /// Wraps two already-open connections.
    pub fn new(source: Connection, destination: Connection, map: RenameMap) -> Self {
        Self {
            source,
            destination,
            map,
            source_path: None,
            destination_path: None,
        }
    }

    /// Preflight and open both databases.
    ///
    /// The source must exist and is opened read-only. Any file already at
    /// `destination` is deleted without prompting, then a fresh database is
    /// created there.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::MissingSource`] if `source` is not a file, or
    /// [`SqliteError::SameFile`] if `destination` resolves to the source. The
    /// destination is left untouched in both cases.
    pub fn open(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        map: RenameMap,
    ) -> Result<Self> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        if !source.is_file() {
            return Err(SqliteError::MissingSource(source.to_path_buf()));
        }
        if destination.exists() {
            let canonical = fs::canonicalize(source)?;
            if canonical == fs::canonicalize(destination)? {
                return Err(SqliteError::SameFile(canonical));
            }
            fs::remove_file(destination)?;
            info!(path = %destination.display(), "removed old output file");
        }

        let source_conn = Connection::open_with_flags(
            source,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let destination_conn = Connection::open(destination)?;

        Ok(Self {
            source: source_conn,
            destination: destination_conn,
            map,
            source_path: Some(source.to_path_buf()),
            destination_path: Some(destination.to_path_buf()),
        })
    }

    /// Plans every table without writing to the destination.
    pub fn plan(&self) -> Result<Vec<PlannedTable>> {
        plan_tables(&self.source, &self.map)
    }

    /// Migrates every discoverable source table and commits once at the end.
    ///
    /// # Errors
    ///
    /// Introspection, row copy, and commit failures abort the run. Rejected
    /// `CREATE TABLE` statements do not; they appear as
    /// [`TableOutcome::Failed`] in the report.
    pub fn run(&mut self) -> Result<MigrationReport> {
        let started_at = Utc::now().to_rfc3339();
        let tables = list_tables(&self.source)?;

        let tx = self.destination.transaction()?;
        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            reports.push(migrate_table(&self.source, &tx, &self.map, table)?);
        }
        tx.commit()?;

        Ok(MigrationReport {
            source_path: self.source_path.clone(),
            destination_path: self.destination_path.clone(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            tables: reports,
        })
    }

    /// Returns the rename map in use.
    pub fn map(&self) -> &RenameMap {
        &self.map
    }

    /// Returns the source connection.
    pub fn source(&self) -> &Connection {
        &self.source
    }

    /// Returns the destination connection.
    pub fn destination(&self) -> &Connection {
        &self.destination
    }

    /// Closes both connections, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.source.close().map_err(|(_, err)| err)?;
        self.destination.close().map_err(|(_, err)| err)?;
        Ok(())
    }
}

/// Migrates one table. Only a failed `CREATE TABLE` is absorbed into the
/// returned report; every other error propagates.
fn migrate_table(
    source: &Connection,
    destination: &Connection,
    map: &RenameMap,
    table: String,
) -> Result<TableReport> {
    let Some(target) = map.table_name(&table).map(str::to_string) else {
        warn!(table = %table, "skipping unmapped table");
        return Ok(TableReport {
            source: table,
            destination: None,
            outcome: TableOutcome::Skipped,
        });
    };

    let columns = table_columns(source, &table)?;
    let plan = match TablePlan::build(map, &table, &target, columns) {
        Ok(plan) => plan,
        Err(err) => {
            error!(
                table = %table,
                destination = %target,
                error = %err,
                "cannot generate table definition"
            );
            return Ok(failed(table, target, String::new(), err.to_string()));
        }
    };

    info!(table = %table, destination = %target, "creating table\n{}", plan.create_sql);
    if let Err(err) = destination.execute_batch(&plan.create_sql) {
        error!(
            table = %table,
            destination = %target,
            error = %err,
            "error creating table; DEFAULT values or constraints may need manual adjustment"
        );
        return Ok(failed(table, target, plan.create_sql, err.to_string()));
    }
    info!(destination = %target, "table created");

    let rows = copy_rows(source, destination, &plan)?;
    let outcome = if rows == 0 {
        info!(destination = %target, "table is empty");
        TableOutcome::Empty
    } else {
        info!(destination = %target, rows, "copied rows");
        TableOutcome::Copied { rows }
    };

    Ok(TableReport {
        source: table,
        destination: Some(target),
        outcome,
    })
}

fn failed(source: String, target: String, statement: String, error: String) -> TableReport {
    TableReport {
        source,
        destination: Some(target),
        outcome: TableOutcome::Failed { statement, error },
    }
}

/// Reads every row of the source table into memory, then inserts them
/// positionally into the destination table.
fn copy_rows(source: &Connection, destination: &Connection, plan: &TablePlan) -> Result<usize> {
    let width = plan.width();
    let mut select = source.prepare(&plan.select_sql)?;
    let rows = select
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut insert = destination.prepare(&plan.insert_sql)?;
    for row in &rows {
        insert.execute(params_from_iter(row.iter()))?;
    }
    Ok(rows.len())
}
