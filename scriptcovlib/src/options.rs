//! Input options for loading and reporting coverage.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::output::reporter::ReporterKind;
use crate::source::filter::FilterConfig;

/// Order of files in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    /// By display name (lexicographical)
    #[default]
    Filename,
    /// Least covered first, ties broken by name
    Coverage,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filename" | "name" | "path" => Ok(SortBy::Filename),
            "coverage" | "percentage" => Ok(SortBy::Coverage),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

/// Options for building a coverage report.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Which dumps (and source files) to consider
    pub filter: FilterConfig,
    /// Output format
    pub reporter: ReporterKind,
    /// Directory file names are shown relative to (none = show as loaded)
    pub base_dir: Option<PathBuf>,
    /// Row order
    pub sort: SortBy,
}

impl ReportOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Set the reporter.
    pub fn reporter(mut self, reporter: ReporterKind) -> Self {
        self.reporter = reporter;
        self
    }

    /// Show file names relative to this directory.
    pub fn relative_to(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Set row order.
    pub fn sort(mut self, sort: SortBy) -> Self {
        self.sort = sort;
        self
    }
}
