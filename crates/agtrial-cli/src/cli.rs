//! CLI argument definitions for the field-trial ingestion tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use agtrial_cli::config::parse_assignment;

#[derive(Parser)]
#[command(
    name = "agtrial",
    version,
    about = "Field-trial lab data ingestion - load lab files into the trial database",
    long_about = "Ingest field-trial lab files (CSV or spreadsheets) into the trial database.\n\n\
                  Soil and tissue chemistry are pivoted to one record per measurement;\n\
                  files with unrecognised columns are staged for review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// TOML config file providing `database`, `trial_id` and `[defaults]`.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file).
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest a batch of lab files for one trial.
    Ingest(IngestArgs),

    /// Inspect or resolve uploads waiting for column review.
    #[command(subcommand)]
    Review(ReviewCommand),

    /// List the supported data types and their canonical fields.
    Types,

    /// Show which data types have been loaded for a trial.
    Coverage(CoverageArgs),
}

#[derive(Parser)]
pub struct IngestArgs {
    /// Files to ingest. Trial summaries are processed first.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Trial the files belong to (otherwise taken from a trial summary).
    #[arg(long = "trial-id", value_name = "ID")]
    pub trial_id: Option<String>,

    /// Default value for a canonical field, as FIELD=VALUE. Repeatable.
    #[arg(long = "default", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub defaults: Vec<(String, String)>,

    /// Print the batch result as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ReviewCommand {
    /// Show headers, sample values and field suggestions for an upload.
    Show(ReviewShowArgs),

    /// Map headers and re-run the upload.
    Submit(ReviewSubmitArgs),
}

#[derive(Parser)]
pub struct ReviewShowArgs {
    /// Raw upload id from the ingest summary.
    #[arg(value_name = "UPLOAD_ID")]
    pub upload_id: i64,

    /// Print the review payload as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ReviewSubmitArgs {
    /// Raw upload id from the ingest summary.
    #[arg(value_name = "UPLOAD_ID")]
    pub upload_id: i64,

    /// Header mapping as HEADER=FIELD. Use `__skip__` to ignore a column and
    /// `__metric__` to pivot it. Repeatable; none retries the stored mapping.
    #[arg(long = "map", value_name = "HEADER=FIELD", value_parser = parse_assignment)]
    pub mappings: Vec<(String, String)>,

    /// Default value for a canonical field, as FIELD=VALUE. Layered over the
    /// defaults stored when the file was ingested. Repeatable.
    #[arg(long = "default", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub defaults: Vec<(String, String)>,

    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CoverageArgs {
    /// Trial to report on.
    #[arg(value_name = "TRIAL_ID")]
    pub trial_id: String,

    /// Print coverage as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
