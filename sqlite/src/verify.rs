//! Checking a destination database against its source.
//!
//! For every mapped source table, verification confirms the renamed table
//! exists, carries the expected column names, and holds the same rows. Rows
//! are compared through a SHA-256 digest of their values, positionally, so
//! only identifiers may differ between the two sides.
//!
//! The digest is order-independent: each row is hashed on its own, the row
//! hashes are sorted, and the sorted list is hashed again.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use schema_rename_core::{RenameMap, select_all};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Result, SqliteError};
use crate::introspect::{list_tables, row_count, table_columns, table_exists};

/// Verification result for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Columns, row count and row digest all agree.
    Match,
    /// The table exists but differs; each reason names one difference.
    Mismatch { reasons: Vec<String> },
    /// The renamed table is absent from the destination.
    MissingTable,
}

/// Per-table verification entry.
#[derive(Debug, Clone, Serialize)]
pub struct TableVerification {
    pub source: String,
    pub destination: String,
    pub source_rows: usize,
    /// Row count in the destination, `None` if the table is missing.
    pub destination_rows: Option<usize>,
    pub outcome: VerifyOutcome,
}

/// Result of verifying every mapped table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub tables: Vec<TableVerification>,
}

impl VerifyReport {
    /// `true` when every mapped table matched.
    pub fn is_match(&self) -> bool {
        self.tables
            .iter()
            .all(|t| t.outcome == VerifyOutcome::Match)
    }

    /// Entries that did not match.
    pub fn problems(&self) -> impl Iterator<Item = &TableVerification> {
        self.tables
            .iter()
            .filter(|t| t.outcome != VerifyOutcome::Match)
    }
}

/// Opens both files read-only and verifies them.
///
/// # Errors
///
/// Returns [`SqliteError::MissingSource`] or
/// [`SqliteError::MissingDestination`] if either file is absent.
pub fn verify_files(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    map: &RenameMap,
) -> Result<VerifyReport> {
    let source = source.as_ref();
    let destination = destination.as_ref();
    if !source.is_file() {
        return Err(SqliteError::MissingSource(source.to_path_buf()));
    }
    if !destination.is_file() {
        return Err(SqliteError::MissingDestination(destination.to_path_buf()));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY;
    let source = Connection::open_with_flags(source, flags)?;
    let destination = Connection::open_with_flags(destination, flags)?;
    verify(&source, &destination, map)
}

/// Verifies every mapped source table against `destination`.
pub fn verify(
    source: &Connection,
    destination: &Connection,
    map: &RenameMap,
) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    for table in list_tables(source)? {
        let Some(target) = map.table_name(&table) else {
            continue;
        };

        let columns = table_columns(source, &table)?;
        let source_rows = row_count(source, &table)?;

        if !table_exists(destination, target)? {
            warn!(table = %table, destination = %target, "destination table missing");
            report.tables.push(TableVerification {
                source: table,
                destination: target.to_string(),
                source_rows,
                destination_rows: None,
                outcome: VerifyOutcome::MissingTable,
            });
            continue;
        }

        let source_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<&str> = source_names
            .iter()
            .map(|name| map.column_name(&table, name))
            .collect();
        let actual: Vec<String> = table_columns(destination, target)?
            .into_iter()
            .map(|c| c.name)
            .collect();
        let destination_rows = row_count(destination, target)?;

        let mut reasons = Vec::new();
        if actual != expected {
            reasons.push(format!(
                "columns differ: expected [{}], found [{}]",
                expected.join(", "),
                actual.join(", ")
            ));
        }
        if destination_rows != source_rows {
            reasons.push(format!(
                "row count differs: source {source_rows}, destination {destination_rows}"
            ));
        }
        // Only compare contents when the shapes line up.
        if reasons.is_empty() {
            let left = table_digest(source, &table, source_names.iter().copied())?;
            let right = table_digest(destination, target, expected.iter().copied())?;
            debug!(table = %table, digest = %left, "source digest");
            if left != right {
                reasons.push("row contents differ".to_string());
            }
        }

        let outcome = if reasons.is_empty() {
            VerifyOutcome::Match
        } else {
            VerifyOutcome::Mismatch { reasons }
        };
        report.tables.push(TableVerification {
            source: table,
            destination: target.to_string(),
            source_rows,
            destination_rows: Some(destination_rows),
            outcome,
        });
    }

    Ok(report)
}

/// Order-independent SHA-256 hex digest of the selected columns of `table`.
pub fn table_digest<'a>(
    conn: &Connection,
    table: &str,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<String> {
    let columns: Vec<&str> = columns.into_iter().collect();
    let width = columns.len();
    let mut stmt = conn.prepare(&select_all(table, columns)?)?;

    let mut row_hashes = stmt
        .query_map([], |row| {
            let mut hasher = Sha256::new();
            for i in 0..width {
                hash_value(&mut hasher, &row.get::<_, Value>(i)?);
            }
            Ok(hasher.finalize().to_vec())
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    row_hashes.sort_unstable();

    let mut hasher = Sha256::new();
    for hash in &row_hashes {
        hasher.update(hash);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Feeds one value into `hasher` with a type tag, so `1` and `'1'` differ.
fn hash_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update([0u8]),
        Value::Integer(i) => {
            hasher.update([1u8]);
            hasher.update(i.to_le_bytes());
        }
        Value::Real(f) => {
            hasher.update([2u8]);
            hasher.update(f.to_bits().to_le_bytes());
        }
        Value::Text(s) => {
            hasher.update([3u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Blob(b) => {
            hasher.update([4u8]);
            hasher.update((b.len() as u64).to_le_bytes());
            hasher.update(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_digest_ignores_row_order_and_names() {
        let a = db("CREATE TABLE t (x, y); INSERT INTO t VALUES (1, 'a'), (2, 'b');");
        let b = db("CREATE TABLE u (p, q); INSERT INTO u VALUES (2, 'b'), (1, 'a');");
        assert_eq!(
            table_digest(&a, "t", ["x", "y"]).unwrap(),
            table_digest(&b, "u", ["p", "q"]).unwrap()
        );
    }

    #[test]
    fn test_digest_distinguishes_types() {
        let a = db("CREATE TABLE t (x); INSERT INTO t VALUES (1);");
        let b = db("CREATE TABLE t (x); INSERT INTO t VALUES ('1');");
        assert_ne!(
            table_digest(&a, "t", ["x"]).unwrap(),
            table_digest(&b, "t", ["x"]).unwrap()
        );
    }

    #[test]
    fn test_verify_reports_each_kind() {
        let source = db(
            "CREATE TABLE t1 (c1 INTEGER PRIMARY KEY, c2 TEXT);
             INSERT INTO t1 VALUES (1, 'Koshi'), (2, 'Madhesh');
             CREATE TABLE t2 (c3 INTEGER, c4 INTEGER, c5 TEXT);
             INSERT INTO t2 VALUES (1, 1, 'Jhapa');
             CREATE TABLE t4 (c10 INTEGER, c11 INTEGER, c12 INTEGER);
             CREATE TABLE scratch (x);",
        );
        let destination = db(
            "CREATE TABLE province (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO province VALUES (1, 'Koshi'), (2, 'Madhesh');
             CREATE TABLE district (id INTEGER, province_id INTEGER, name TEXT);
             INSERT INTO district VALUES (1, 1, 'Ilam');",
        );

        let report = verify(&source, &destination, RenameMap::builtin()).unwrap();
        assert_eq!(report.tables.len(), 3);
        assert_eq!(report.tables[0].outcome, VerifyOutcome::Match);
        assert_eq!(
            report.tables[1].outcome,
            VerifyOutcome::Mismatch {
                reasons: vec!["row contents differ".to_string()]
            }
        );
        assert_eq!(report.tables[2].outcome, VerifyOutcome::MissingTable);
        assert!(!report.is_match());
        assert_eq!(report.problems().count(), 2);
    }

    #[test]
    fn test_verify_column_name_mismatch() {
        let source = db("CREATE TABLE t1 (c1 INTEGER, c2 TEXT);");
        let destination = db("CREATE TABLE province (c1 INTEGER, c2 TEXT);");
        let report = verify(&source, &destination, RenameMap::builtin()).unwrap();
        match &report.tables[0].outcome {
            VerifyOutcome::Mismatch { reasons } => {
                assert!(reasons[0].starts_with("columns differ"), "{reasons:?}");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }
}
