//! Table and column rename maps.
//!
//! A [`RenameMap`] pairs the table mapping (old table name → new table name)
//! with per-table column mappings (old column name → new column name). Tables
//! absent from the table mapping are not migrated; columns absent from their
//! table's column mapping keep their original name.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Old → new table names for the voter identity database.
const VOTER_TABLES: &[(&str, &str)] = &[
    ("t1", "province"),
    ("t2", "district"),
    ("t3", "municipality"),
    ("t4", "ward"),
    ("t5", "election_booth"),
    ("t6", "voter"),
    ("t7", "voterdetails"),
    ("t8", "tags"),
    ("t9", "voter_tag"),
    ("t10", "main_ethnic_category"),
    ("t11", "sub_ethnic_category"),
    ("t12", "lastnames"),
    ("t13", "categorized"),
];

/// Old → new column names, scoped by old table name.
const VOTER_COLUMNS: &[(&str, &[(&str, &str)])] = &[
    ("t1", &[("c1", "id"), ("c2", "name")]),
    ("t2", &[("c3", "id"), ("c4", "province_id"), ("c5", "name")]),
    (
        "t3",
        &[("c6", "id"), ("c7", "district_id"), ("c8", "name"), ("c9", "type")],
    ),
    (
        "t4",
        &[("c10", "id"), ("c11", "municipality_id"), ("c12", "ward_no")],
    ),
    (
        "t5",
        &[
            ("c13", "id"),
            ("c14", "ward_id"),
            ("c15", "booth_code"),
            ("c16", "booth_name"),
        ],
    ),
    (
        "t6",
        &[
            ("c17", "id"),
            ("c18", "booth_id"),
            ("c19", "voter_no"),
            ("c20", "name_np"),
            ("c21", "age"),
            ("c22", "gender"),
            ("c23", "spouse_name_np"),
            ("c24", "parent_name_np"),
        ],
    ),
    (
        "t7",
        &[
            ("c25", "id"),
            ("c26", "voterid"),
            ("c27", "name"),
            ("c28", "phone"),
            ("c29", "landline"),
            ("c30", "social_media"),
        ],
    ),
    (
        "t8",
        &[
            ("c31", "id"),
            ("c32", "name"),
            ("c33", "category"),
            ("c34", "created_at"),
        ],
    ),
    (
        "t9",
        &[
            ("c35", "voterdetail_id"),
            ("c36", "tag_id"),
            ("c37", "assigned_at"),
        ],
    ),
    (
        "t10",
        &[
            ("c38", "MID"),
            ("c39", "Mname"),
            ("c40", "description"),
            ("c41", "created_at"),
            ("c42", "updated_at"),
        ],
    ),
    (
        "t11",
        &[
            ("c43", "SID"),
            ("c44", "MID"),
            ("c45", "Sname"),
            ("c46", "description"),
            ("c47", "created_at"),
            ("c48", "updated_at"),
        ],
    ),
    (
        "t12",
        &[
            ("c49", "id"),
            ("c50", "SID"),
            ("c51", "lastname"),
            ("c52", "root"),
            ("c53", "root_np"),
            ("c54", "variants_en"),
            ("c55", "variants_np"),
            ("c56", "is_ambiguous"),
            ("c57", "notes"),
            ("c58", "created_at"),
            ("c59", "updated_at"),
        ],
    ),
    (
        "t13",
        &[
            ("c60", "id"),
            ("c61", "voter_no"),
            ("c62", "name"),
            ("c63", "Mname"),
            ("c64", "Sname"),
            ("c65", "Lastname"),
            ("c66", "created_at"),
        ],
    ),
];

static BUILTIN: LazyLock<RenameMap> = LazyLock::new(|| {
    let mut map = RenameMap::new();
    for (old, new) in VOTER_TABLES {
        map.tables.insert((*old).to_string(), (*new).to_string());
    }
    for (table, columns) in VOTER_COLUMNS {
        let scoped = map.columns.entry((*table).to_string()).or_default();
        for (old, new) in *columns {
            scoped.insert((*old).to_string(), (*new).to_string());
        }
    }
    map
});

/// Immutable rename configuration for one migration run.
///
/// # Examples
///
/// ```
/// use schema_rename_core::RenameMap;
///
/// let map = RenameMap::new()
///     .with_table("t1", "province")
///     .with_column("t1", "c1", "id");
///
/// assert_eq!(map.table_name("t1"), Some("province"));
/// assert_eq!(map.table_name("t99"), None);
/// assert_eq!(map.column_name("t1", "c1"), "id");
/// // Unmapped columns keep their name.
/// assert_eq!(map.column_name("t1", "c2"), "c2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMap {
    /// Old table name → new table name.
    #[serde(default)]
    pub tables: BTreeMap<String, String>,
    /// Old table name → (old column name → new column name).
    #[serde(default)]
    pub columns: BTreeMap<String, BTreeMap<String, String>>,
}

impl RenameMap {
    /// Creates an empty map. Every table is unmapped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the built-in voter identity mapping (`t1`..`t13`).
    pub fn builtin() -> &'static RenameMap {
        &BUILTIN
    }

    /// Adds a table rename.
    pub fn with_table(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.tables.insert(old.into(), new.into());
        self
    }

    /// Adds a column rename scoped to `table` (the old table name).
    pub fn with_column(
        mut self,
        table: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        self.columns
            .entry(table.into())
            .or_default()
            .insert(old.into(), new.into());
        self
    }

    /// Destination name for a source table, or `None` if it is not migrated.
    pub fn table_name(&self, table: &str) -> Option<&str> {
        self.tables.get(table).map(String::as_str)
    }

    /// Destination name for a source column, falling back to `column` itself.
    pub fn column_name<'a>(&'a self, table: &str, column: &'a str) -> &'a str {
        self.columns
            .get(table)
            .and_then(|scoped| scoped.get(column))
            .map_or(column, String::as_str)
    }

    /// Returns `true` if `table` has a table mapping.
    pub fn is_mapped(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Number of mapped tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Total number of column renames across all tables.
    pub fn column_count(&self) -> usize {
        self.columns.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_all_voter_tables() {
        let map = RenameMap::builtin();
        assert_eq!(map.table_count(), 13);
        assert_eq!(map.table_name("t1"), Some("province"));
        assert_eq!(map.table_name("t9"), Some("voter_tag"));
        assert_eq!(map.table_name("t13"), Some("categorized"));
        assert_eq!(map.column_count(), 66);
    }

    #[test]
    fn test_builtin_column_scoping() {
        let map = RenameMap::builtin();
        assert_eq!(map.column_name("t1", "c1"), "id");
        assert_eq!(map.column_name("t9", "c35"), "voterdetail_id");
        assert_eq!(map.column_name("t12", "c56"), "is_ambiguous");
        // c1 belongs to t1 only
        assert_eq!(map.column_name("t2", "c1"), "c1");
    }

    #[test]
    fn test_identity_fallback_for_unknown_table() {
        let map = RenameMap::builtin();
        assert_eq!(map.column_name("nope", "c1"), "c1");
        assert!(!map.is_mapped("nope"));
    }

    #[test]
    fn test_serde_shape() {
        let map = RenameMap::new()
            .with_table("t1", "province")
            .with_column("t1", "c1", "id");
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["tables"]["t1"], "province");
        assert_eq!(json["columns"]["t1"]["c1"], "id");

        let back: RenameMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_missing_columns_section_defaults_empty() {
        let map: RenameMap = serde_json::from_str(r#"{"tables": {"a": "b"}}"#).unwrap();
        assert_eq!(map.table_name("a"), Some("b"));
        assert_eq!(map.column_count(), 0);
    }
}
