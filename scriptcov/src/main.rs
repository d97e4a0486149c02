//! # scriptcov
//!
//! A CLI tool for reporting source-level coverage of instrumented scripts.
//!
//! ## Overview
//!
//! scriptcov is built on top of scriptcovlib. The instrumenting runtime writes
//! one `*.cov.json` dump per covered file; scriptcov finds those dumps, joins
//! them with the original sources and reports line and block coverage.
//!
//! ## Usage
//!
//! ```bash
//! # Summary table for all dumps below the current directory
//! scriptcov
//!
//! # Only some dumps, least covered first
//! scriptcov coverage/ --include "**/lib/**" --sort coverage
//!
//! # Skip vendored code entirely
//! scriptcov --ignore vendor --ignore lib/generated.js
//!
//! # Missing lines with markers, or the full statistics as JSON
//! scriptcov --reporter plain
//! scriptcov --reporter json
//! ```
//!
//! Set `RUST_LOG=scriptcovlib=debug` to trace loading and stats computation.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Once;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use scriptcovlib::data::{collect_coverage, coverage_table, render_report};
use scriptcovlib::{FilterConfig, ReportOptions, ReporterKind, SortBy};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("scriptcov")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Source-level coverage reports for instrumented scripts")
        .arg(
            Arg::new("path")
                .help("Coverage dumps or directories to search (defaults to current directory)")
                .action(ArgAction::Append)
                .default_value("."),
        )
        .arg(
            Arg::new("reporter")
                .short('r')
                .long("reporter")
                .value_parser(["cli", "json", "plain"])
                .default_value("cli")
                .help("Output format"),
        )
        .arg(
            Arg::new("include")
                .short('i')
                .long("include")
                .action(ArgAction::Append)
                .help("Include dumps matching glob pattern"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Exclude dumps matching glob pattern"),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .action(ArgAction::Append)
                .help("Ignore a source file or directory (can be specified multiple times)"),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_parser(["filename", "coverage"])
                .default_value("filename")
                .help("Row order"),
        )
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let mut filter = FilterConfig::new();

    if let Some(includes) = matches.get_many::<String>("include") {
        for pattern in includes {
            filter = filter.include(pattern)?;
        }
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    if let Some(ignored) = matches.get_many::<String>("ignore") {
        for path in ignored {
            filter = filter.ignore(path);
        }
    }

    Ok(filter)
}

/// Build report options from matches
fn build_options(matches: &ArgMatches) -> anyhow::Result<ReportOptions> {
    let reporter = matches
        .get_one::<String>("reporter")
        .map(|s| ReporterKind::from_str(s))
        .transpose()?
        .unwrap_or_default();
    let sort = matches
        .get_one::<String>("sort")
        .map(|s| SortBy::from_str(s))
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;

    Ok(ReportOptions::new()
        .filter(build_filter(matches)?)
        .reporter(reporter)
        .sort(sort)
        .relative_to(cwd))
}

/// Extract search roots from matches, made absolute
fn extract_paths(matches: &ArgMatches) -> anyhow::Result<Vec<PathBuf>> {
    matches
        .get_many::<String>("path")
        .into_iter()
        .flatten()
        .map(|p| std::path::absolute(p).with_context(|| format!("invalid path '{p}'")))
        .collect()
}

fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let options = build_options(matches)?;
    let roots = extract_paths(matches)?;

    let run = collect_coverage(&roots, &options)?;
    tracing::debug!(files = run.len(), "collected coverage");

    let output = match options.reporter {
        ReporterKind::Cli => render::render_table(&coverage_table(&run, &options)?),
        ReporterKind::Json | ReporterKind::Plain => render_report(&run, &options)?,
    };

    Ok(output)
}

fn main() -> ExitCode {
    init_tracing();
    let matches = build_command().get_matches();

    match run(&matches) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
