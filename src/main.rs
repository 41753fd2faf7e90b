//! Supportbook CLI - support desk record book

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use owo_colors::OwoColorize;
use supportbook::config::{self, SupportConfig};
use supportbook::output::{emit_error, emit_success, is_quiet, OutputMode};
use supportbook::record::ColumnValues;
use supportbook::storage::{DbLocation, RecordStore};
use supportbook::ui::{self, theme, Icons, SheetRow};
use supportbook::views::{EntryForm, PendingReturns, SearchGrid};
use supportbook::{ErrorKind, ReasonList, SchemaRegistry, Sheet};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "supportbook")]
#[command(version)]
#[command(about = "Support desk record book - per-token transfers and refunds")]
#[command(long_about = r#"
Supportbook keeps one table per token sheet and lets operators:
  • Enter incoming transfers
  • Work through refunds that are still outstanding
  • Search, edit and delete records

Example usage:
  supportbook add --sheet "TON" -f fio="Ivan Petrov" -f memo=12345 ...
  supportbook pending --sheet "TON"
  supportbook resolve --sheet "TON" --id 4 -s return_hash=0xabc -s return_done=+ -s "status=return done"
  supportbook list --sheet "BTC - Bitcoin" --filter petrov
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List sheets with their tables and record counts
    Sheets,

    /// Show the columns of a sheet
    Columns {
        /// Sheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Enter a new incoming transfer
    Add {
        /// Sheet name (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Field value as column=value (repeatable)
        #[arg(short, long = "field", value_name = "COLUMN=VALUE")]
        fields: Vec<String>,
    },

    /// List records whose refund is not done
    Pending {
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Edit a record from the pending list
    Resolve {
        #[arg(long)]
        sheet: Option<String>,

        /// Record id
        #[arg(long)]
        id: i64,

        /// New value as column=value (repeatable)
        #[arg(short, long = "set", value_name = "COLUMN=VALUE")]
        set: Vec<String>,
    },

    /// List all records, newest first
    List {
        #[arg(long)]
        sheet: Option<String>,

        /// Only rows containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one record
    Show {
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        id: i64,
    },

    /// Edit a record from the search grid
    Edit {
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        id: i64,

        #[arg(short, long = "set", value_name = "COLUMN=VALUE")]
        set: Vec<String>,
    },

    /// Delete a record
    Delete {
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long)]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage the shared list of refund reasons
    Reasons {
        #[command(subcommand)]
        action: ReasonAction,
    },
}

#[derive(Subcommand)]
enum ReasonAction {
    /// Print all reasons
    List,
    /// Append a reason
    Add {
        reason: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Sheets => "sheets",
            Commands::Columns { .. } => "columns",
            Commands::Add { .. } => "add",
            Commands::Pending { .. } => "pending",
            Commands::Resolve { .. } => "resolve",
            Commands::List { .. } => "list",
            Commands::Show { .. } => "show",
            Commands::Edit { .. } => "edit",
            Commands::Delete { .. } => "delete",
            Commands::Reasons { .. } => "reasons",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(log_level(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(false)))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Uncaught panic: {}", info);
    }));

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let command = cli.command.name();

    match run(cli, output_mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = match e.downcast_ref::<supportbook::Error>().map(supportbook::Error::kind) {
                Some(ErrorKind::Configuration) => "configuration",
                Some(ErrorKind::Validation) => "validation",
                Some(ErrorKind::Backend) => "backend",
                None => "other",
            };
            if shows_failure(output_mode) {
                tracing::debug!(command, kind, "{:#}", e);
                ui::error(&format!("{:#}", e));
            } else {
                tracing::error!(command, kind, "{:#}", e);
                if let Err(print_err) = emit_error(command, kind, format!("{:#}", e)) {
                    tracing::error!("Failed to print error: {}", print_err);
                }
            }
            ExitCode::FAILURE
        }
    }
}

/// Default filter directive when `RUST_LOG` is unset
fn log_level(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Human output prints failures itself, so the log line drops to debug
fn shows_failure(mode: OutputMode) -> bool {
    mode.is_human()
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let registry = SchemaRegistry::builtin();

    if let Commands::Init { force } = cli.command {
        let path = cli.config.unwrap_or_else(config::default_config_path);
        let cfg = SupportConfig {
            database: Some(config::default_database_path().display().to_string()),
            reasons: Some(config::default_reasons_path().display().to_string()),
            ..Default::default()
        };
        config::write_config(&path, &cfg, force)?;
        if output_mode.is_human() {
            ui::success(&format!("Config written to {}", path.display()));
        }
        return emit_success(output_mode, "init", serde_json::json!({ "path": path }));
    }

    let cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    cfg.check(&registry)?;

    if let Commands::Reasons { action } = cli.command {
        return run_reasons(action, &cfg, output_mode);
    }

    let db_path = cfg.database_path(cli.database.as_deref());
    config::ensure_db_dir(&db_path)?;
    let mut store = RecordStore::new(&registry, DbLocation::File(db_path));

    let result = run_records(cli.command, &registry, &cfg, &mut store, output_mode);
    store.close()?;
    result
}

fn resolve_sheet<'r>(registry: &'r SchemaRegistry, name: Option<&str>) -> anyhow::Result<&'r Sheet> {
    match name {
        Some(name) => Ok(registry.lookup(name)?),
        None => registry
            .default_sheet()
            .ok_or_else(|| anyhow::anyhow!("no sheets configured")),
    }
}

/// Record count per sheet, in registry order
fn sheet_counts(registry: &SchemaRegistry, store: &mut RecordStore<'_>) -> anyhow::Result<Vec<usize>> {
    store.ensure_connected()?;
    let mut counts = Vec::new();
    for sheet in registry.sheets() {
        counts.push(store.count(sheet)?);
    }
    Ok(counts)
}

fn parse_assignments(raw: &[String]) -> anyhow::Result<ColumnValues> {
    let mut values = ColumnValues::new();
    for item in raw {
        let (column, value) = ColumnValues::parse_assignment(item)?;
        values.set(column, value);
    }
    Ok(values)
}

fn run_records(
    command: Commands,
    registry: &SchemaRegistry,
    cfg: &SupportConfig,
    store: &mut RecordStore<'_>,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let human = output_mode.is_human() && !is_quiet();

    match command {
        Commands::Sheets => {
            let counts = sheet_counts(registry, store)?;
            if output_mode.is_human() {
                let rows: Vec<SheetRow> = registry
                    .sheets()
                    .zip(&counts)
                    .map(|(sheet, count)| SheetRow {
                        name: sheet.name.clone(),
                        table: sheet.table.clone(),
                        token: sheet.token.clone(),
                        memo: if sheet.has_memo() { "yes".into() } else { "-".into() },
                        records: count.to_string(),
                    })
                    .collect();
                println!("{}", ui::sheets_table(&rows));
            } else {
                let data: Vec<_> = registry
                    .sheets()
                    .zip(&counts)
                    .map(|(s, count)| serde_json::json!({ "sheet": s, "records": count }))
                    .collect();
                emit_success(output_mode, "sheets", data)?;
            }
        }

        Commands::Columns { sheet } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            if output_mode.is_human() {
                ui::section(&format!("{} ({})", sheet.name, sheet.table));
                for column in sheet.schema.columns() {
                    let note = match (column.required, column.managed) {
                        (_, true) => ui::muted("filled automatically"),
                        (true, false) => "required".to_string(),
                        (false, false) => ui::dim("optional"),
                    };
                    ui::summary_row(&format!("{:<20}", column.name), &format!("{} ({})", column.label, note));
                }
            } else {
                emit_success(output_mode, "columns", &sheet.schema)?;
            }
        }

        Commands::Add { sheet, fields } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            let form = EntryForm::with_fields(sheet, parse_assignments(&fields)?);
            if human {
                ui::status(Icons::COIN, "Token", form.token());
            }
            let id = form.submit(store)?;
            if output_mode.is_human() {
                ui::success(&format!("Record #{} added to {}", id, sheet.name));
            }
            emit_success(output_mode, "add", serde_json::json!({ "sheet": sheet.name, "id": id }))?;
        }

        Commands::Pending { sheet } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            let view = PendingReturns::new(sheet, &cfg.validation.pending);
            let records = view.load(store)?;
            if output_mode.is_human() {
                if human {
                    ui::status(Icons::PENDING, "Pending returns", &format!("{} ({})", sheet.name, records.len()));
                }
                if records.is_empty() {
                    ui::success("Nothing pending.");
                } else {
                    println!("{}", ui::records_table(sheet, &records.iter().collect::<Vec<_>>()));
                }
            } else {
                emit_success(output_mode, "pending", &records)?;
            }
        }

        Commands::Resolve { sheet, id, set } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            let view = PendingReturns::new(sheet, &cfg.validation.pending);
            let changed = view.save(store, id, &parse_assignments(&set)?)?;
            report_change(output_mode, "resolve", sheet, id, changed, "saved")?;
        }

        Commands::List { sheet, filter } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            let mut grid = SearchGrid::new(sheet, &cfg.validation.search);
            grid.load(store)?;
            let records = grid.filter(filter.as_deref().unwrap_or_default());
            if output_mode.is_human() {
                if human {
                    ui::status(Icons::SEARCH, "Records", &format!("{} ({})", sheet.name, records.len()));
                }
                if records.is_empty() {
                    ui::warn("No records found.");
                } else {
                    println!("{}", ui::records_table(sheet, &records));
                }
            } else {
                emit_success(output_mode, "list", &records)?;
            }
        }

        Commands::Show { sheet, id } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            store.ensure_connected()?;
            match store.fetch(sheet, id)? {
                Some(record) if output_mode.is_human() => ui::record_detail(sheet, &record),
                Some(record) => emit_success(output_mode, "show", &record)?,
                None => anyhow::bail!("no record #{} in {}", id, sheet.name),
            }
        }

        Commands::Edit { sheet, id, set } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            let mut grid = SearchGrid::new(sheet, &cfg.validation.search);
            let changed = grid.save(store, id, &parse_assignments(&set)?)?;
            report_change(output_mode, "edit", sheet, id, changed, "saved")?;
        }

        Commands::Delete { sheet, id, yes } => {
            let sheet = resolve_sheet(registry, sheet.as_deref())?;
            if !yes && !confirm(&format!("Really delete record #{} from {}?", id, sheet.name))? {
                if output_mode.is_human() {
                    ui::warn("Cancelled.");
                }
                return Ok(());
            }
            let mut grid = SearchGrid::new(sheet, &cfg.validation.search);
            let changed = grid.delete(store, id)?;
            report_change(output_mode, "delete", sheet, id, changed, "deleted")?;
        }

        Commands::Init { .. } | Commands::Reasons { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

fn report_change(
    output_mode: OutputMode,
    command: &str,
    sheet: &Sheet,
    id: i64,
    changed: usize,
    verb: &str,
) -> anyhow::Result<()> {
    if output_mode.is_human() {
        if changed == 0 {
            ui::warn(&format!("No record #{} in {}", id, sheet.name));
        } else {
            ui::success(&format!("Record #{} {}", id, verb));
        }
    }
    emit_success(
        output_mode,
        command,
        serde_json::json!({ "sheet": sheet.name, "id": id, "changed": changed }),
    )
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let term = console::Term::stderr();
    if !term.is_term() {
        anyhow::bail!("refusing to delete without confirmation (pass --yes)");
    }
    term.write_str(&format!("{} {} [y/N] ", Icons::DEL, prompt.style(theme().warn.clone())))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn run_reasons(action: ReasonAction, cfg: &SupportConfig, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut reasons = ReasonList::load(&cfg.reasons_path())?;

    match action {
        ReasonAction::List => {
            if output_mode.is_human() {
                ui::section("Return reasons");
                for (i, reason) in reasons.iter().enumerate() {
                    ui::summary_row(&format!("{:>3}.", i + 1), reason);
                }
            } else {
                emit_success(output_mode, "reasons", reasons.iter().collect::<Vec<_>>())?;
            }
        }
        ReasonAction::Add { reason } => {
            let added = reasons.add(&reason)?;
            if output_mode.is_human() {
                if added {
                    ui::success(&format!("Reason added ({} total)", reasons.len()));
                } else {
                    ui::warn("Reason is blank or already listed.");
                }
            }
            emit_success(output_mode, "reasons", serde_json::json!({ "added": added, "total": reasons.len() }))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(log_level(false), "info");
        assert_eq!(log_level(true), "debug");
    }

    #[test]
    fn test_failure_reported_once_per_mode() {
        assert!(shows_failure(OutputMode::Human));
        assert!(!shows_failure(OutputMode::Json));
    }

    #[test]
    fn test_sheet_counts_follow_registry_order() {
        let registry = SchemaRegistry::builtin();
        let mut store = RecordStore::open_in_memory(&registry).unwrap();
        let ton = registry.lookup("TON").unwrap();

        let values: ColumnValues = ton
            .schema
            .columns()
            .map(|c| (c.name, String::new()))
            .collect::<ColumnValues>()
            .with("status", "return not done");
        store.insert(ton, &values).unwrap();
        store.insert(ton, &values).unwrap();

        let counts = sheet_counts(&registry, &mut store).unwrap();
        assert_eq!(counts.len(), registry.len());
        for (sheet, count) in registry.sheets().zip(&counts) {
            let expected = if sheet.name == "TON" { 2 } else { 0 };
            assert_eq!(*count, expected, "{}", sheet.name);
        }
    }
}
