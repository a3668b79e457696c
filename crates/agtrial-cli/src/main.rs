//! Field-trial ingestion CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

use agtrial_cli::commands::{
    IngestRequest, open_store, run_coverage, run_ingest, run_review_show, run_review_submit,
};
use agtrial_cli::config::{AppConfig, flag_defaults};
use agtrial_cli::logging::{LogConfig, LogFormat, init_logging};
use agtrial_cli::summary::{
    coverage_table, file_result_table, print_batch_summary, print_review, types_table,
};
use agtrial_model::FileStatus;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, ReviewCommand};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = AppConfig::load_optional(cli.config.as_deref())?;
    let database = config.database(cli.database.as_deref());

    match cli.command {
        Command::Ingest(args) => {
            let request = IngestRequest {
                files: args.files,
                trial_id: config.trial_id(args.trial_id.as_deref()),
                defaults: config.defaults(&args.defaults),
            };
            let result = run_ingest(open_store(&database)?, request)?;
            if args.json {
                print_json(&result)?;
            } else {
                print_batch_summary(&result);
            }
            Ok(i32::from(result.has_errors()))
        }
        Command::Review(ReviewCommand::Show(args)) => {
            let payload = run_review_show(open_store(&database)?, args.upload_id)?;
            if args.json {
                print_json(&payload)?;
            } else {
                print_review(&payload);
            }
            Ok(0)
        }
        Command::Review(ReviewCommand::Submit(args)) => {
            let result = run_review_submit(
                open_store(&database)?,
                args.upload_id,
                &args.mappings,
                flag_defaults(&args.defaults),
            )?;
            if args.json {
                print_json(&result)?;
            } else {
                println!("{}", file_result_table(&result));
            }
            Ok(i32::from(result.status == FileStatus::Error))
        }
        Command::Types => {
            println!("{}", types_table());
            Ok(0)
        }
        Command::Coverage(args) => {
            let store = open_store(&database)?;
            let report = run_coverage(&store, &args.trial_id)?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("Trial: {}", report.trial_id);
                println!("{}", coverage_table(&report.entries, &report.counts));
            }
            Ok(0)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
