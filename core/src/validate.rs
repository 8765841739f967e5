//! Rename map validation.
//!
//! Catches mappings that would make a migration fail part-way, such as two
//! source tables renamed onto the same destination table, before any file is
//! touched.
//!
//! # Examples
//!
//! ```
//! use schema_rename_core::*;
//!
//! assert!(validate_map(RenameMap::builtin()).is_empty());
//!
//! let clash = RenameMap::new()
//!     .with_table("t1", "province")
//!     .with_table("t2", "province");
//! let errors = validate_map(&clash);
//! assert!(errors.iter().any(|e| matches!(e, MappingError::DuplicateTable { .. })));
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::RenameMap;

/// Rename map validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A table mapping has an empty source or destination name.
    #[error("empty table name in mapping {old:?} -> {new:?}")]
    EmptyTableName { old: String, new: String },
    /// A column mapping has an empty source or destination name.
    #[error("empty column name in table {table}: {old:?} -> {new:?}")]
    EmptyColumnName {
        table: String,
        old: String,
        new: String,
    },
    /// Two source tables share a destination name.
    #[error("tables {first} and {second} both rename to {target}")]
    DuplicateTable {
        target: String,
        first: String,
        second: String,
    },
    /// Two columns of one table share a destination name.
    #[error("columns {first} and {second} of table {table} both rename to {target}")]
    DuplicateColumn {
        table: String,
        target: String,
        first: String,
        second: String,
    },
    /// Column renames are scoped to a table that is never migrated.
    #[error("column mapping for unmapped table {0}")]
    OrphanColumns(String),
}

/// Validates a rename map, returning every problem found.
///
/// Destination names are compared case-insensitively, matching how SQLite
/// resolves identifiers.
pub fn validate_map(map: &RenameMap) -> Vec<MappingError> {
    let mut errors = Vec::new();

    let mut targets: HashMap<String, &str> = HashMap::new();
    for (old, new) in &map.tables {
        if old.trim().is_empty() || new.trim().is_empty() {
            errors.push(MappingError::EmptyTableName {
                old: old.clone(),
                new: new.clone(),
            });
            continue;
        }
        if let Some(first) = targets.insert(new.to_ascii_lowercase(), old) {
            errors.push(MappingError::DuplicateTable {
                target: new.clone(),
                first: first.to_string(),
                second: old.clone(),
            });
        }
    }

    for (table, columns) in &map.columns {
        if !map.is_mapped(table) {
            errors.push(MappingError::OrphanColumns(table.clone()));
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        for (old, new) in columns {
            if old.trim().is_empty() || new.trim().is_empty() {
                errors.push(MappingError::EmptyColumnName {
                    table: table.clone(),
                    old: old.clone(),
                    new: new.clone(),
                });
                continue;
            }
            if let Some(first) = seen.insert(new.to_ascii_lowercase(), old) {
                errors.push(MappingError::DuplicateColumn {
                    table: table.clone(),
                    target: new.clone(),
                    first: first.to_string(),
                    second: old.clone(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        assert_eq!(validate_map(RenameMap::builtin()), Vec::new());
    }

    #[test]
    fn test_empty_map_is_valid() {
        assert!(validate_map(&RenameMap::new()).is_empty());
    }

    #[test]
    fn test_duplicate_table_case_insensitive() {
        let map = RenameMap::new()
            .with_table("a", "Voter")
            .with_table("b", "voter");
        let errors = validate_map(&map);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            MappingError::DuplicateTable { first, second, .. } if first == "a" && second == "b"
        ));
    }

    #[test]
    fn test_duplicate_column_within_table() {
        let map = RenameMap::new()
            .with_table("t1", "province")
            .with_column("t1", "c1", "id")
            .with_column("t1", "c2", "id");
        let errors = validate_map(&map);
        assert!(matches!(&errors[0], MappingError::DuplicateColumn { table, .. } if table == "t1"));
    }

    #[test]
    fn test_same_column_name_in_different_tables_is_fine() {
        let map = RenameMap::new()
            .with_table("t1", "province")
            .with_table("t2", "district")
            .with_column("t1", "c1", "id")
            .with_column("t2", "c3", "id");
        assert!(validate_map(&map).is_empty());
    }

    #[test]
    fn test_orphan_columns() {
        let map = RenameMap::new().with_column("ghost", "c1", "id");
        assert_eq!(
            validate_map(&map),
            vec![MappingError::OrphanColumns("ghost".to_string())]
        );
    }

    #[test]
    fn test_empty_names() {
        let map = RenameMap::new()
            .with_table("t1", " ")
            .with_column("t1", "", "id");
        let errors = validate_map(&map);
        assert!(errors.iter().any(|e| matches!(e, MappingError::EmptyTableName { .. })));
        assert!(errors.iter().any(|e| matches!(e, MappingError::EmptyColumnName { .. })));
    }
}
