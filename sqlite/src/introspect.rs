//! Reading table and column metadata from an SQLite connection.

use rusqlite::Connection;
use schema_rename_core::{ColumnDescriptor, DefaultValue, quote_ident};
use tracing::debug;

use crate::error::Result;

/// Lists user tables in creation order, excluding SQLite's own `sqlite_*`
/// tables.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
         ORDER BY rowid",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(count = tables.len(), "discovered tables");
    Ok(tables)
}

/// Returns `true` if `table` exists in `conn`.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let count: i64 = stmt.query_row([table], |row| row.get(0))?;
    Ok(count > 0)
}

/// Reads `table`'s columns in declaration order via `PRAGMA table_info`.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)?))?;
    let columns = stmt
        .query_map([], |row| {
            let decl_type: Option<String> = row.get(2)?;
            let not_null: i64 = row.get(3)?;
            let default: Option<String> = row.get(4)?;
            let pk: i64 = row.get(5)?;
            Ok(ColumnDescriptor {
                name: row.get(1)?,
                decl_type: decl_type.unwrap_or_default(),
                not_null: not_null != 0,
                default: default.as_deref().map(DefaultValue::classify),
                pk_position: u32::try_from(pk).unwrap_or(0),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(table, columns = columns.len(), "read column metadata");
    Ok(columns)
}

/// Counts rows in `table`.
pub fn row_count(conn: &Connection, table: &str) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table)?);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or(0))
}
