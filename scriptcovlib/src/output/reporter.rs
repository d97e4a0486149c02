//! Pluggable report formatters.
//!
//! A reporter is fed one file at a time through [`Reporter::format`] and
//! produces its final rendering from [`Reporter::finish`].

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::stats::CoverageStats;
use crate::error::ScriptcovError;
use crate::output::table::{format_percentage, CoverageTable};
use crate::Result;

/// A report formatter.
pub trait Reporter {
    /// Short name used on the command line.
    fn name(&self) -> &'static str;

    /// Add one file to the report.
    fn format(&mut self, filename: &str, stats: &CoverageStats) -> Result<()>;

    /// Produce the rendered report.
    fn finish(&mut self) -> Result<String>;
}

/// Available reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReporterKind {
    /// Summary table
    #[default]
    Cli,
    /// Structured `{filename, stats, source}` objects
    Json,
    /// Missing lines with markers under the uncovered ranges
    Plain,
}

impl ReporterKind {
    /// Instantiate the reporter.
    pub fn create(self) -> Box<dyn Reporter> {
        match self {
            ReporterKind::Cli => Box::new(CliReporter::new()),
            ReporterKind::Json => Box::new(JsonReporter::new()),
            ReporterKind::Plain => Box::new(PlainReporter::new()),
        }
    }
}

impl FromStr for ReporterKind {
    type Err = ScriptcovError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cli" | "table" => Ok(ReporterKind::Cli),
            "json" => Ok(ReporterKind::Json),
            "plain" | "text" => Ok(ReporterKind::Plain),
            _ => Err(ScriptcovError::UnknownReporter(s.to_string())),
        }
    }
}

/// Tabular summary, one row per file.
#[derive(Debug, Clone, Default)]
pub struct CliReporter {
    table: CoverageTable,
}

impl CliReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table built so far.
    pub fn table(&self) -> &CoverageTable {
        &self.table
    }

    /// Take the finished table, for callers that render it themselves.
    pub fn into_table(self) -> CoverageTable {
        self.table
    }
}

impl Reporter for CliReporter {
    fn name(&self) -> &'static str {
        "cli"
    }

    fn format(&mut self, filename: &str, stats: &CoverageStats) -> Result<()> {
        self.table.push(filename, stats);
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        Ok(self.table.render())
    }
}

/// One file in the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFileReport {
    pub filename: String,
    pub stats: CoverageStats,
    pub source: String,
}

/// JSON array of per-file reports.
#[derive(Debug, Clone, Default)]
pub struct JsonReporter {
    files: Vec<JsonFileReport>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn format(&mut self, filename: &str, stats: &CoverageStats) -> Result<()> {
        self.files.push(JsonFileReport {
            filename: filename.to_string(),
            source: stats.source.clone(),
            stats: stats.clone(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.files)?;
        out.push('\n');
        Ok(out)
    }
}

/// Line-by-line listing of uncovered code.
///
/// Fully uncovered lines are prefixed with `!`, partially covered ones with
/// `~`. Below each line, carets mark the missing column ranges.
#[derive(Debug, Clone, Default)]
pub struct PlainReporter {
    out: String,
}

impl PlainReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for PlainReporter {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn format(&mut self, filename: &str, stats: &CoverageStats) -> Result<()> {
        let out = &mut self.out;
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{}: {} lines ({} of {} missing), {} blocks ({} of {} missing)",
            filename,
            format_percentage(stats.percentage),
            stats.missing,
            stats.total,
            format_percentage(stats.blocks.percentage),
            stats.blocks.missing,
            stats.blocks.total,
        );

        let gutter = stats
            .coverage
            .keys()
            .next_back()
            .map_or(1, |last| last.to_string().len());

        for (lineno, entry) in &stats.coverage {
            let flag = if entry.partial { '~' } else { '!' };
            let _ = writeln!(out, "{flag} {lineno:>gutter$} | {}", entry.source);

            let mut marker = String::new();
            for range in &entry.missing {
                // Marker is ASCII, so byte length is its width
                let start = range.start_column.max(marker.len());
                let end = range.end_column.max(start + 1);
                marker.extend(std::iter::repeat(' ').take(start - marker.len()));
                marker.extend(std::iter::repeat('^').take(end - start));
            }
            let _ = writeln!(out, "  {:>gutter$} | {}", "", marker);
        }
        out.push('\n');
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.out))
    }
}
