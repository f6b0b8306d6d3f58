//! Command-line front end: `serve`, `check`, `fmt`, `stats`, `lookup`.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};
use serde::Serialize;
use thiserror::Error;

use crate::checks::{
    CheckSettings,
    Finding,
    check_catalog,
    check_read_error,
    has_errors,
};
use crate::config::{
    ConfigError,
    ConfigManager,
    FileMatcher,
    MatcherError,
    TsSettings,
};
use crate::indexer::workspace::WorkspaceIndexer;
use crate::lookup::Translator;
use crate::stats::CatalogStats;
use crate::ts::{
    ReadError,
    read_catalog,
    write_catalog,
};

#[derive(Debug, Parser)]
#[command(
    name = "qt-ts-ls",
    version,
    about = "Language server and checker for Qt Linguist .ts catalogs"
)]
pub struct Cli {
    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Settings file; defaults to `.qt-ts-ls.json` in the current directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the language server on stdio (the default).
    Serve,
    /// Check catalogs and report problems.
    Check(CheckArgs),
    /// Rewrite catalogs in `lupdate` layout.
    Fmt(FmtArgs),
    /// Show translation progress per catalog.
    Stats(StatsArgs),
    /// Translate one message the way an application would.
    Lookup(LookupArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Catalog files or directories to search.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct FmtArgs {
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Only report files that would change.
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    #[arg(long)]
    pub context: String,

    #[arg(long)]
    pub source: String,

    /// Disambiguation comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Count for plural messages.
    #[arg(short = 'n', allow_negative_numbers = true)]
    pub count: Option<i64>,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error("{}: no such file or directory", .0.display())]
    NotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`serve` runs the language server and cannot be used here")]
    Serve,
}

/// Whether a command found what it was asked to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// Errors were found, or files need formatting.
    Failure,
}

impl CommandStatus {
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Loads settings from `--config`, or from the current directory.
///
/// # Errors
/// The configuration file cannot be read, parsed or validated.
pub fn load_settings(config: Option<&Path>, current_dir: &Path) -> Result<TsSettings, CliError> {
    let mut manager = ConfigManager::new();
    match config {
        Some(path) => manager.load_file(path)?,
        None => manager.load_settings(Some(current_dir.to_path_buf()))?,
    }
    Ok(manager.get_settings().clone())
}

/// Runs a batch command, writing its report to `out`.
///
/// # Errors
/// A path or catalog cannot be read, or `out` fails.
pub fn run(
    command: Command,
    settings: &TsSettings,
    out: &mut impl Write,
) -> Result<CommandStatus, CliError> {
    match command {
        Command::Serve => Err(CliError::Serve),
        Command::Check(args) => run_check(&args, settings, out),
        Command::Fmt(args) => run_fmt(&args, settings, out),
        Command::Stats(args) => run_stats(&args, settings, out),
        Command::Lookup(args) => run_lookup(&args, out),
    }
}

/// Expands directories into the catalogs they contain.
///
/// # Errors
/// A path does not exist, or the configured patterns are invalid.
pub fn collect_catalogs(
    paths: &[PathBuf],
    settings: &TsSettings,
) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let matcher = FileMatcher::new(path.clone(), settings)?;
            files.extend(WorkspaceIndexer::find_catalog_files(&matcher));
        } else {
            return Err(CliError::NotFound(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "Collected catalogs");
    Ok(files)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindingRecord<'a> {
    path: String,
    line: u32,
    character: u32,
    severity: &'static str,
    rule: &'static str,
    message: &'a str,
}

fn run_check(
    args: &CheckArgs,
    settings: &TsSettings,
    out: &mut impl Write,
) -> Result<CommandStatus, CliError> {
    let check_settings = CheckSettings::from(settings);
    let files = collect_catalogs(&args.paths, settings)?;

    let mut results: Vec<(PathBuf, Vec<Finding>)> = Vec::with_capacity(files.len());
    for path in files {
        let text = read_file(&path)?;
        let findings = match read_catalog(&text) {
            Ok(outcome) => check_catalog(&outcome, &check_settings),
            Err(error) => check_read_error(&error, &check_settings),
        };
        results.push((path, findings));
    }

    let failed = results.iter().any(|(_, findings)| has_errors(findings));

    match args.format {
        OutputFormat::Text => {
            let mut total = 0;
            for (path, findings) in &results {
                for finding in findings {
                    writeln!(
                        out,
                        "{}:{}:{}: {} [{}] {}",
                        path.display(),
                        finding.range.start.line + 1,
                        finding.range.start.character + 1,
                        finding.severity,
                        finding.rule,
                        finding.message
                    )?;
                }
                total += findings.len();
            }
            if total == 0 {
                writeln!(out, "No problems found in {} catalogs", results.len())?;
            } else {
                writeln!(out, "{total} problems found in {} catalogs", results.len())?;
            }
        }
        OutputFormat::Json => {
            let records: Vec<FindingRecord<'_>> = results
                .iter()
                .flat_map(|(path, findings)| {
                    findings.iter().map(|finding| FindingRecord {
                        path: path.display().to_string(),
                        line: finding.range.start.line + 1,
                        character: finding.range.start.character + 1,
                        severity: finding.severity.as_str(),
                        rule: finding.rule.id(),
                        message: &finding.message,
                    })
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
    }

    Ok(if failed { CommandStatus::Failure } else { CommandStatus::Success })
}

fn run_fmt(
    args: &FmtArgs,
    settings: &TsSettings,
    out: &mut impl Write,
) -> Result<CommandStatus, CliError> {
    let mut status = CommandStatus::Success;

    for path in collect_catalogs(&args.paths, settings)? {
        let text = read_file(&path)?;
        let outcome = match read_catalog(&text) {
            Ok(outcome) => outcome,
            Err(error) => {
                writeln!(out, "{}: cannot format: {error}", path.display())?;
                status = CommandStatus::Failure;
                continue;
            }
        };
        if !outcome.is_lossless() {
            writeln!(
                out,
                "{}: skipped: contains elements that would be lost; run `check` for details",
                path.display()
            )?;
            status = CommandStatus::Failure;
            continue;
        }

        let formatted = write_catalog(&outcome.catalog);
        if formatted == text {
            continue;
        }
        if args.check {
            writeln!(out, "Would reformat {}", path.display())?;
            status = CommandStatus::Failure;
        } else {
            std::fs::write(&path, formatted)
                .map_err(|source| CliError::Io { path: path.clone(), source })?;
            tracing::info!(path = %path.display(), "Formatted catalog");
            writeln!(out, "Formatted {}", path.display())?;
        }
    }

    Ok(status)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsRecord {
    path: String,
    language: Option<String>,
    #[serde(flatten)]
    stats: CatalogStats,
    completion: f64,
}

fn run_stats(
    args: &StatsArgs,
    settings: &TsSettings,
    out: &mut impl Write,
) -> Result<CommandStatus, CliError> {
    let mut records = Vec::new();
    for path in collect_catalogs(&args.paths, settings)? {
        let text = read_file(&path)?;
        let outcome =
            read_catalog(&text).map_err(|source| CliError::Read { path: path.clone(), source })?;
        let stats = CatalogStats::from_catalog(&outcome.catalog);
        records.push(StatsRecord {
            path: path.display().to_string(),
            language: outcome.catalog.language,
            completion: stats.completion(),
            stats,
        });
    }

    match args.format {
        OutputFormat::Text => {
            writeln!(
                out,
                "{:<40} {:<8} {:>8} {:>10} {:>8} {:>8} {:>7}",
                "CATALOG", "LANG", "FINISHED", "UNFINISHED", "OBSOLETE", "VANISHED", "DONE"
            )?;
            for record in &records {
                writeln!(
                    out,
                    "{:<40} {:<8} {:>8} {:>10} {:>8} {:>8} {:>6.1}%",
                    record.path,
                    record.language.as_deref().unwrap_or("-"),
                    record.stats.finished,
                    record.stats.unfinished,
                    record.stats.obsolete,
                    record.stats.vanished,
                    record.completion
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
    }

    Ok(CommandStatus::Success)
}

fn run_lookup(args: &LookupArgs, out: &mut impl Write) -> Result<CommandStatus, CliError> {
    let text = read_file(&args.catalog)?;
    let outcome = read_catalog(&text)
        .map_err(|source| CliError::Read { path: args.catalog.clone(), source })?;
    let translator = Translator::from_catalog(&outcome.catalog);

    let translated =
        translator.translate(&args.context, &args.source, args.comment.as_deref(), args.count);
    writeln!(out, "{translated}")?;

    Ok(CommandStatus::Success)
}
