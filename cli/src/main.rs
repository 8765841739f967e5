use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rusqlite::{Connection, OpenFlags};
use schema_rename_config::RunConfig;
use schema_rename_core::{RenameMap, validate_map};
use schema_rename_sqlite::{
    MigrationReport, PlannedTable, SqliteError, TableOutcome, VerifyOutcome, VerifyReport,
    migrate_file, plan_tables, verify_files,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Mapping output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum MappingFormat {
    Yaml,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "schema-rename")]
#[command(about = "Copy an SQLite database into a new file with renamed tables and columns")]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate the source database into a freshly created destination.
    Run(ReportArgs),
    /// Print the statements a run would execute, without writing anything.
    Plan(ReportArgs),
    /// Compare a migrated destination against its source.
    Verify(ReportArgs),
    /// Inspect the rename map.
    Mapping(MappingArgs),
}

/// Where to read from, where to write to, and which rename map to use.
#[derive(Debug, Args)]
struct TargetArgs {
    /// Source database (default: voter_identity.db).
    #[arg(long)]
    source: Option<PathBuf>,
    /// Destination database, deleted and recreated on each run
    /// (default: voter_list_readable.db).
    #[arg(long)]
    destination: Option<PathBuf>,
    /// JSON or YAML rename map file (default: built-in voter mapping).
    #[arg(long)]
    mapping: Option<PathBuf>,
    /// YAML run configuration. Explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct MappingArgs {
    #[command(subcommand)]
    operation: MappingOperation,
}

#[derive(Debug, Subcommand)]
enum MappingOperation {
    /// Print the active rename map.
    Show(MappingShowArgs),
    /// Check the active rename map for conflicts.
    Validate(MappingValidateArgs),
}

#[derive(Debug, Args)]
struct MappingShowArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: MappingFormat,
}

#[derive(Debug, Args)]
struct MappingValidateArgs {
    #[command(flatten)]
    target: TargetArgs,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let result = match cli.command {
        Command::Run(args) => run_migrate(args),
        Command::Plan(args) => run_plan(args),
        Command::Verify(args) => run_verify(args),
        Command::Mapping(args) => run_mapping(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Configuration resolution
// ---------------------------------------------------------------------------

struct Resolved {
    source: PathBuf,
    destination: PathBuf,
    map: RenameMap,
}

fn resolve(args: &TargetArgs) -> Result<Resolved, String> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(source) = &args.source {
        config.source = source.clone();
    }
    if let Some(destination) = &args.destination {
        config.destination = destination.clone();
    }
    if let Some(mapping) = &args.mapping {
        config.mapping_file = Some(mapping.clone());
        config.mapping = None;
    }

    let map = config
        .resolve_mapping()
        .map_err(|e| format!("Failed to load mapping: {e}"))?;
    debug!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        tables = map.table_count(),
        "resolved configuration"
    );

    Ok(Resolved {
        source: config.source,
        destination: config.destination,
        map,
    })
}

fn require_valid(map: &RenameMap) -> Result<(), String> {
    let errors = validate_map(map);
    if errors.is_empty() {
        return Ok(());
    }
    for err in &errors {
        eprintln!("  {err}");
    }
    Err(format!("rename map has {} problem(s)", errors.len()))
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn run_migrate(args: ReportArgs) -> Result<(), String> {
    let resolved = resolve(&args.target)?;
    require_valid(&resolved.map)?;

    let report = match migrate_file(&resolved.source, &resolved.destination, resolved.map) {
        Ok(report) => report,
        Err(SqliteError::MissingSource(path)) => {
            return Err(format!("Input file '{}' not found.", path.display()));
        }
        Err(err) => return Err(format!("Migration failed: {err}")),
    };

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            print_migration_report(&report);
            let output = std::fs::canonicalize(&resolved.destination)
                .unwrap_or_else(|_| resolved.destination.clone());
            println!("\nDone! Output database: {}", output.display());
        }
    }
    Ok(())
}

fn print_migration_report(report: &MigrationReport) {
    println!("Migration Summary:");
    println!("  Tables migrated: {}", report.migrated());
    println!("  Tables skipped: {}", report.skipped());
    println!("  Tables failed: {}", report.failed());
    println!("  Rows copied: {}", report.rows_copied());

    if !report.tables.is_empty() {
        println!("\nTables:");
    }
    for table in &report.tables {
        let target = table.destination.as_deref().unwrap_or("-");
        match &table.outcome {
            TableOutcome::Copied { rows } => {
                println!("  {} -> {target}: copied {rows} rows", table.source);
            }
            TableOutcome::Empty => println!("  {} -> {target}: table is empty", table.source),
            TableOutcome::Skipped => println!("  {}: skipped (unmapped)", table.source),
            TableOutcome::Failed { .. } => println!("  {} -> {target}: FAILED", table.source),
        }
    }

    if report.failed() > 0 {
        eprintln!("\nFailures:");
        for table in &report.tables {
            if let TableOutcome::Failed { statement, error } = &table.outcome {
                eprintln!("  {}: {error}", table.source);
                if !statement.is_empty() {
                    eprintln!("{statement}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// plan
// ---------------------------------------------------------------------------

fn run_plan(args: ReportArgs) -> Result<(), String> {
    let resolved = resolve(&args.target)?;
    if !resolved.source.is_file() {
        return Err(format!(
            "Input file '{}' not found.",
            resolved.source.display()
        ));
    }

    let conn = Connection::open_with_flags(&resolved.source, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| format!("Failed to open database '{}': {e}", resolved.source.display()))?;
    let planned =
        plan_tables(&conn, &resolved.map).map_err(|e| format!("Planning failed: {e}"))?;

    match args.format {
        OutputFormat::Json => print_json(&planned)?,
        OutputFormat::Text => {
            for entry in &planned {
                match entry {
                    PlannedTable::Unmapped { source } => {
                        println!("Skipping unmapped table: {source}");
                    }
                    PlannedTable::Ready(plan) => {
                        println!("\nTable: {} -> {}", plan.source, plan.destination);
                        println!("{}", plan.create_sql);
                        println!("{};", plan.select_sql);
                        println!("{};", plan.insert_sql);
                        println!("{}", "-".repeat(60));
                    }
                    PlannedTable::Invalid {
                        source,
                        destination,
                        error,
                    } => {
                        println!("\nTable: {source} -> {destination}");
                        println!("  cannot generate statement: {error}");
                    }
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

fn run_verify(args: ReportArgs) -> Result<(), String> {
    let resolved = resolve(&args.target)?;
    let report = verify_files(&resolved.source, &resolved.destination, &resolved.map)
        .map_err(|e| format!("Verification failed: {e}"))?;

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_verify_report(&report),
    }

    let problems = report.problems().count();
    if problems > 0 {
        return Err(format!("{problems} table(s) differ from the source"));
    }
    Ok(())
}

fn print_verify_report(report: &VerifyReport) {
    println!("Verification:");
    for table in &report.tables {
        match &table.outcome {
            VerifyOutcome::Match => println!(
                "  {} -> {}: OK ({} rows)",
                table.source, table.destination, table.source_rows
            ),
            VerifyOutcome::MissingTable => {
                println!("  {} -> {}: MISSING", table.source, table.destination);
            }
            VerifyOutcome::Mismatch { reasons } => {
                println!("  {} -> {}: MISMATCH", table.source, table.destination);
                for reason in reasons {
                    println!("    {reason}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// mapping
// ---------------------------------------------------------------------------

fn run_mapping(args: MappingArgs) -> Result<(), String> {
    match args.operation {
        MappingOperation::Show(a) => run_mapping_show(a),
        MappingOperation::Validate(a) => run_mapping_validate(a),
    }
}

fn run_mapping_show(args: MappingShowArgs) -> Result<(), String> {
    let resolved = resolve(&args.target)?;
    let text = match args.format {
        MappingFormat::Json => serde_json::to_string_pretty(&resolved.map)
            .map_err(|e| format!("JSON serialization failed: {e}"))?,
        MappingFormat::Yaml => serde_yaml::to_string(&resolved.map)
            .map_err(|e| format!("YAML serialization failed: {e}"))?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn run_mapping_validate(args: MappingValidateArgs) -> Result<(), String> {
    let resolved = resolve(&args.target)?;
    require_valid(&resolved.map)?;
    println!(
        "Mapping OK: {} tables, {} column renames",
        resolved.map.table_count(),
        resolved.map.column_count()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{json}");
    Ok(())
}
