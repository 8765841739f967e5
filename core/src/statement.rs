//! SQL statement generation for renamed tables.
//!
//! [`CreateTable`] turns a list of [`ColumnDef`]s into a validated
//! `CREATE TABLE` statement. [`select_all`] and [`insert_row`] build the
//! positional statements used to copy rows between the source table and its
//! renamed counterpart.
//!
//! All identifiers are double-quoted with embedded quotes doubled, so renamed
//! names such as `type` or `MID` need no special handling.

use std::collections::HashSet;

use thiserror::Error;

use crate::column::{ColumnDescriptor, DefaultValue};
use crate::mapping::RenameMap;

/// Errors raised while building a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatementError {
    /// Identifier is empty or whitespace-only.
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    /// Identifier contains a NUL byte.
    #[error("identifier contains a null byte: {0:?}")]
    NulInIdentifier(String),
    /// A table must have at least one column.
    #[error("table {0} has no columns")]
    NoColumns(String),
    /// Two columns resolve to the same destination name.
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
}

/// Convenience alias for results with [`StatementError`].
pub type Result<T> = std::result::Result<T, StatementError>;

/// Quotes an SQLite identifier.
///
/// # Examples
///
/// ```
/// use schema_rename_core::quote_ident;
///
/// assert_eq!(quote_ident("voter").unwrap(), "\"voter\"");
/// assert_eq!(quote_ident("odd\"name").unwrap(), "\"odd\"\"name\"");
/// assert!(quote_ident("").is_err());
/// ```
pub fn quote_ident(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(StatementError::EmptyIdentifier);
    }
    if name.contains('\0') {
        return Err(StatementError::NulInIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn quote_list<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let quoted = names
        .into_iter()
        .map(quote_ident)
        .collect::<Result<Vec<_>>>()?;
    Ok(quoted.join(", "))
}

/// One destination column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Destination column name.
    pub name: String,
    /// Declared type copied from the source.
    pub decl_type: String,
    /// Renders `NOT NULL` when set.
    pub not_null: bool,
    /// Default value, rendered as a `DEFAULT` clause.
    pub default: Option<DefaultValue>,
    /// 1-based primary key position, 0 if not a key column.
    pub pk_position: u32,
}

impl ColumnDef {
    /// Builds the destination definition for a source column, renaming it
    /// through `map` within `table`.
    pub fn renamed(map: &RenameMap, table: &str, column: &ColumnDescriptor) -> Self {
        Self {
            name: map.column_name(table, &column.name).to_string(),
            decl_type: column.decl_type.clone(),
            not_null: column.not_null,
            default: column.default.clone(),
            pk_position: column.pk_position,
        }
    }

    /// Renders the clause. `inline_pk` controls whether a key column gets a
    /// column-level `PRIMARY KEY`.
    fn render(&self, inline_pk: bool) -> Result<String> {
        let mut parts = vec![quote_ident(&self.name)?];
        if !self.decl_type.trim().is_empty() {
            parts.push(self.decl_type.clone());
        }
        if self.not_null {
            parts.push("NOT NULL".to_string());
        }
        if inline_pk && self.pk_position > 0 {
            parts.push("PRIMARY KEY".to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {default}"));
        }
        Ok(parts.join(" "))
    }
}

/// Builder for a `CREATE TABLE` statement.
///
/// # Examples
///
/// ```
/// use schema_rename_core::{ColumnDef, ColumnDescriptor, CreateTable, RenameMap};
///
/// let map = RenameMap::new()
///     .with_table("t1", "province")
///     .with_column("t1", "c1", "id")
///     .with_column("t1", "c2", "name");
/// let columns = [
///     ColumnDescriptor::new("c1", "INTEGER").primary_key(1),
///     ColumnDescriptor::new("c2", "TEXT"),
/// ];
///
/// let sql = CreateTable::new("province")
///     .columns(columns.iter().map(|c| ColumnDef::renamed(&map, "t1", c)))
///     .build()
///     .unwrap();
/// assert_eq!(
///     sql,
///     "CREATE TABLE \"province\" (\n  \"id\" INTEGER PRIMARY KEY,\n  \"name\" TEXT\n)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CreateTable {
    name: String,
    columns: Vec<ColumnDef>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    pub fn columns(mut self, defs: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(defs);
        self
    }

    /// Validates the definitions and renders the statement.
    ///
    /// A single key column is declared inline. Composite keys are declared
    /// as a trailing table constraint in key order, since SQLite rejects
    /// more than one column-level `PRIMARY KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError`] for an empty column list, an invalid
    /// identifier, or two columns with the same (case-insensitive) name.
    pub fn build(&self) -> Result<String> {
        let table = quote_ident(&self.name)?;
        if self.columns.is_empty() {
            return Err(StatementError::NoColumns(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for def in &self.columns {
            if !seen.insert(def.name.to_ascii_lowercase()) {
                return Err(StatementError::DuplicateColumn {
                    table: self.name.clone(),
                    column: def.name.clone(),
                });
            }
        }

        let mut keys: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|c| c.pk_position > 0)
            .collect();
        keys.sort_by_key(|c| c.pk_position);
        let inline_pk = keys.len() <= 1;

        let mut clauses = self
            .columns
            .iter()
            .map(|def| def.render(inline_pk))
            .collect::<Result<Vec<_>>>()?;
        if !inline_pk {
            let key_list = quote_list(keys.iter().map(|c| c.name.as_str()))?;
            clauses.push(format!("PRIMARY KEY ({key_list})"));
        }

        Ok(format!("CREATE TABLE {table} (\n  {}\n)", clauses.join(",\n  ")))
    }
}

/// `SELECT` of `columns` from `table`, in the given order.
pub fn select_all<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let list = quote_list(columns)?;
    Ok(format!("SELECT {list} FROM {}", quote_ident(table)?))
}

/// Positional `INSERT` into `table` with one `?N` placeholder per column.
///
/// # Examples
///
/// ```
/// use schema_rename_core::insert_row;
///
/// let sql = insert_row("province", ["id", "name"]).unwrap();
/// assert_eq!(sql, "INSERT INTO \"province\" (\"id\", \"name\") VALUES (?1, ?2)");
/// ```
pub fn insert_row<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let columns: Vec<&str> = columns.into_iter().collect();
    if columns.is_empty() {
        return Err(StatementError::NoColumns(table.to_string()));
    }
    let list = quote_list(columns.iter().copied())?;
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "INSERT INTO {} ({list}) VALUES ({placeholders})",
        quote_ident(table)?
    ))
}
