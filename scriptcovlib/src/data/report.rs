//! High-level reporting API.
//!
//! Loads coverage dumps into a [`CoverageRun`] and renders them through the
//! selected reporter.

use std::path::{Component, Path, PathBuf};

use crate::data::dump::load_session;
use crate::data::session::CoverageRun;
use crate::data::stats::CoverageStats;
use crate::options::{ReportOptions, SortBy};
use crate::output::reporter::{CliReporter, Reporter};
use crate::output::table::CoverageTable;
use crate::source::filter::discover_dumps_in;
use crate::Result;

/// Load every dump found under `roots` into a fresh run.
///
/// Sessions whose source file is ignored by the filter are dropped.
pub fn collect_coverage(roots: &[PathBuf], options: &ReportOptions) -> Result<CoverageRun> {
    let dumps = discover_dumps_in(roots, &options.filter)?;
    let mut run = CoverageRun::new();

    for dump in dumps {
        let session = load_session(&dump)?;
        if options.filter.is_ignored(session.filename()) {
            tracing::debug!(path = %session.filename().display(), "source file ignored");
            continue;
        }
        run.register(session);
    }

    Ok(run)
}

/// Display name of a file, relative to `base`.
///
/// Files outside `base` climb out with `..` as long as both paths are
/// absolute and share a root; otherwise the path is shown as given.
pub fn display_name(path: &Path, base: Option<&Path>) -> String {
    let Some(base) = base else {
        return path.to_string_lossy().to_string();
    };
    if let Ok(rel) = path.strip_prefix(base) {
        return rel.to_string_lossy().to_string();
    }
    if !path.is_absolute() || !base.is_absolute() {
        return path.to_string_lossy().to_string();
    }

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.to_string_lossy().to_string();
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part);
    }
    rel.to_string_lossy().to_string()
}

/// Compute stats for every session, named and ordered per the options.
pub fn file_stats(run: &CoverageRun, options: &ReportOptions) -> Result<Vec<(String, CoverageStats)>> {
    let base = options.base_dir.as_deref();
    let mut files: Vec<(String, CoverageStats)> = run
        .stats()?
        .into_iter()
        .map(|(path, stats)| (display_name(&path, base), stats))
        .collect();

    match options.sort {
        SortBy::Filename => files.sort_by(|a, b| a.0.cmp(&b.0)),
        SortBy::Coverage => files.sort_by(|a, b| {
            a.1.percentage
                .total_cmp(&b.1.percentage)
                .then_with(|| a.0.cmp(&b.0))
        }),
    }

    Ok(files)
}

/// Build the summary table through the `cli` reporter.
///
/// Callers that style the table themselves (colours, widths) start here
/// instead of from the rendered text.
pub fn coverage_table(run: &CoverageRun, options: &ReportOptions) -> Result<CoverageTable> {
    let mut reporter = CliReporter::new();
    for (name, stats) in file_stats(run, options)? {
        reporter.format(&name, &stats)?;
    }
    Ok(reporter.into_table())
}

/// Render a run with the reporter selected in `options`.
pub fn render_report(run: &CoverageRun, options: &ReportOptions) -> Result<String> {
    let mut reporter = options.reporter.create();
    for (name, stats) in file_stats(run, options)? {
        reporter.format(&name, &stats)?;
    }
    tracing::debug!(reporter = reporter.name(), files = run.len(), "rendered report");
    reporter.finish()
}
