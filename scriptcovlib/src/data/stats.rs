//! Core data structures for coverage statistics

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::gaps::{self, ratio, BlockStats, NodeStats};
use crate::data::lines::{build_line_coverage, LineCoverageMap};
use crate::data::manifest::InstrumentationManifest;
use crate::data::recorder::CoverageRecorder;

/// A source line containing at least one missing node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingLine {
    /// 1-based line number
    pub lineno: usize,
    /// Text of the line
    pub source: String,
}

/// Coverage statistics for a single file.
///
/// A snapshot is computed fresh on every request and holds no reference to
/// the recorder it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Fraction of lines without any missing node
    pub percentage: f64,
    /// Lines with at least one missing node, ascending
    pub lines: Vec<MissingLine>,
    /// Number of lines with at least one missing node
    pub missing: usize,
    /// `total - missing`
    pub seen: usize,
    /// Number of lines in the source
    pub total: usize,
    /// Per-line missing ranges
    pub coverage: LineCoverageMap,
    /// Source text as seen by the instrumentor
    pub source: String,
    /// Node-level totals
    pub nodes: NodeStats,
    /// Block-level totals
    pub blocks: BlockStats,
}

/// Split source text into lines the way coverage line numbers count them.
///
/// Splits on `'\n'` only, so a trailing newline produces a final empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Compute the statistics snapshot for one file.
///
/// `source_lines` is the file's current text split with [`split_lines`];
/// `source` is the text the instrumentor saw, reported verbatim. A line counts
/// as missing as soon as one missing node starts on it, even if other nodes on
/// the same line ran.
pub fn compute_stats(
    manifest: &InstrumentationManifest,
    recorder: &CoverageRecorder,
    source_lines: &[&str],
    source: &str,
) -> CoverageStats {
    let mut missing = gaps::missing(manifest, recorder);
    let seen = gaps::seen(manifest, recorder);

    let coverage = build_line_coverage(&missing, &seen, source_lines);

    missing.sort_by_key(|node| node.location.start_line);
    let mut observed = HashSet::new();
    let lines: Vec<MissingLine> = missing
        .iter()
        .map(|node| node.location.start_line)
        .filter(|line| observed.insert(*line))
        .map(|line| MissingLine {
            lineno: line + 1,
            source: source_lines.get(line).copied().unwrap_or_default().to_string(),
        })
        .collect();

    let total = source_lines.len();
    let missing_lines = lines.len();
    let seen_lines = total.saturating_sub(missing_lines);

    tracing::debug!(
        nodes = manifest.len(),
        missing_lines,
        total_lines = total,
        "computed coverage stats"
    );

    CoverageStats {
        percentage: ratio(seen_lines, total),
        lines,
        missing: missing_lines,
        seen: seen_lines,
        total,
        coverage,
        source: source.to_string(),
        nodes: gaps::node_stats(manifest, recorder),
        blocks: gaps::block_stats(manifest, recorder),
    }
}
