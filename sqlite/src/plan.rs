//! Per-table migration plans.
//!
//! A [`TablePlan`] holds everything needed to move one source table: its
//! column metadata and the three generated statements. Plans are pure data,
//! so the same value drives both a dry run and a real migration.

use rusqlite::Connection;
use schema_rename_core::{
    ColumnDef, ColumnDescriptor, CreateTable, RenameMap, StatementError, insert_row, select_all,
};
use serde::Serialize;

use crate::error::Result;
use crate::introspect::{list_tables, table_columns};

/// Statements and metadata for migrating one table.
#[derive(Debug, Clone, Serialize)]
pub struct TablePlan {
    /// Source table name.
    pub source: String,
    /// Destination table name.
    pub destination: String,
    /// Source columns in declaration order.
    #[serde(skip)]
    pub columns: Vec<ColumnDescriptor>,
    /// Destination column names, positionally matching `columns`.
    pub destination_columns: Vec<String>,
    pub create_sql: String,
    pub select_sql: String,
    pub insert_sql: String,
}

impl TablePlan {
    /// Builds the plan for `source` → `destination` from introspected
    /// columns.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError`] if the renamed definition is invalid, for
    /// example when two columns map to the same name.
    pub fn build(
        map: &RenameMap,
        source: &str,
        destination: &str,
        columns: Vec<ColumnDescriptor>,
    ) -> std::result::Result<Self, StatementError> {
        let defs: Vec<ColumnDef> = columns
            .iter()
            .map(|column| ColumnDef::renamed(map, source, column))
            .collect();
        let destination_columns: Vec<String> = defs.iter().map(|d| d.name.clone()).collect();

        let create_sql = CreateTable::new(destination).columns(defs).build()?;
        let select_sql = select_all(source, columns.iter().map(|c| c.name.as_str()))?;
        let insert_sql = insert_row(destination, destination_columns.iter().map(String::as_str))?;

        Ok(Self {
            source: source.to_string(),
            destination: destination.to_string(),
            columns,
            destination_columns,
            create_sql,
            select_sql,
            insert_sql,
        })
    }

    /// Number of columns copied per row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// What a dry run decided for one source table.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlannedTable {
    /// The table has no table mapping and will be skipped.
    Unmapped { source: String },
    /// The table will be created and copied.
    Ready(TablePlan),
    /// The table is mapped but its statement could not be generated.
    Invalid {
        source: String,
        destination: String,
        error: String,
    },
}

impl PlannedTable {
    /// Source table name.
    pub fn source(&self) -> &str {
        match self {
            Self::Unmapped { source } | Self::Invalid { source, .. } => source,
            Self::Ready(plan) => &plan.source,
        }
    }
}

/// Plans every discoverable table in `conn` without writing anywhere.
pub fn plan_tables(conn: &Connection, map: &RenameMap) -> Result<Vec<PlannedTable>> {
    let mut planned = Vec::new();
    for source in list_tables(conn)? {
        let Some(destination) = map.table_name(&source) else {
            planned.push(PlannedTable::Unmapped { source });
            continue;
        };
        let columns = table_columns(conn, &source)?;
        planned.push(match TablePlan::build(map, &source, destination, columns) {
            Ok(plan) => PlannedTable::Ready(plan),
            Err(err) => PlannedTable::Invalid {
                destination: destination.to_string(),
                source,
                error: err.to_string(),
            },
        });
    }
    Ok(planned)
}
