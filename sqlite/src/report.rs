//! Migration run reports.

use std::path::PathBuf;

use serde::Serialize;

/// Result of migrating one source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Table created and `rows` rows copied.
    Copied { rows: usize },
    /// Table created; the source had no rows.
    Empty,
    /// No table mapping; nothing was created.
    Skipped,
    /// The destination rejected the generated statement, or it could not be
    /// generated. The table was not copied.
    Failed { statement: String, error: String },
}

/// Per-table entry in a [`MigrationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    /// Source table name.
    pub source: String,
    /// Destination table name, `None` for unmapped tables.
    pub destination: Option<String>,
    pub outcome: TableOutcome,
}

impl TableReport {
    /// Rows copied for this table.
    pub fn rows(&self) -> usize {
        match self.outcome {
            TableOutcome::Copied { rows } => rows,
            _ => 0,
        }
    }
}

/// Summary of a whole migration run.
///
/// Returned by [`Migrator::run`](crate::Migrator::run) and
/// [`migrate_file`](crate::migrate_file). Serializes to JSON for
/// `--format json` output.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Source database path, when opened from a file.
    pub source_path: Option<PathBuf>,
    /// Destination database path, when opened from a file.
    pub destination_path: Option<PathBuf>,
    /// RFC 3339 timestamp taken before table discovery.
    pub started_at: String,
    /// RFC 3339 timestamp taken after the final commit.
    pub finished_at: String,
    /// One entry per discovered source table, in discovery order.
    pub tables: Vec<TableReport>,
}

impl MigrationReport {
    /// Number of tables created in the destination, including empty ones.
    pub fn migrated(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| matches!(t.outcome, TableOutcome::Copied { .. } | TableOutcome::Empty))
            .count()
    }

    /// Number of unmapped tables.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Skipped))
    }

    /// Number of tables whose creation failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TableOutcome::Failed { .. }))
    }

    /// Total rows copied across all tables.
    pub fn rows_copied(&self) -> usize {
        self.tables.iter().map(TableReport::rows).sum()
    }

    /// Looks up the entry for a source table.
    pub fn table(&self, source: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.source == source)
    }

    fn count(&self, pred: impl Fn(&TableOutcome) -> bool) -> usize {
        self.tables.iter().filter(|t| pred(&t.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, outcome: TableOutcome) -> TableReport {
        TableReport {
            source: source.to_string(),
            destination: Some(format!("{source}_new")),
            outcome,
        }
    }

    #[test]
    fn test_counters() {
        let report = MigrationReport {
            source_path: None,
            destination_path: None,
            started_at: "2024-01-15T10:30:00Z".into(),
            finished_at: "2024-01-15T10:30:01Z".into(),
            tables: vec![
                entry("t1", TableOutcome::Copied { rows: 2 }),
                entry("t6", TableOutcome::Copied { rows: 40 }),
                entry("t9", TableOutcome::Empty),
                entry("audit", TableOutcome::Skipped),
                entry(
                    "t3",
                    TableOutcome::Failed {
                        statement: "CREATE TABLE ...".into(),
                        error: "boom".into(),
                    },
                ),
            ],
        };
        assert_eq!(report.migrated(), 3);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.rows_copied(), 42);
        assert_eq!(report.table("t9").unwrap().outcome, TableOutcome::Empty);
        assert!(report.table("missing").is_none());
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(TableOutcome::Copied { rows: 3 }).unwrap();
        assert_eq!(json["status"], "copied");
        assert_eq!(json["rows"], 3);

        let json = serde_json::to_value(TableOutcome::Skipped).unwrap();
        assert_eq!(json["status"], "skipped");
    }
}
