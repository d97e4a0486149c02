//! Per-line coverage: attributing missing nodes to source lines.
//!
//! Missing nodes that span several lines are first exploded into one
//! single-line fragment per line. The fragments and the single-line missing
//! nodes are then sorted, deduplicated by start column, and grouped into a
//! map keyed by 1-based line number.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::manifest::{ManifestNode, NodeLocation};

/// An uncovered column range on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRange {
    pub start_column: usize,
    pub end_column: usize,
}

/// Coverage of one source line that has at least one uncovered range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoverageEntry {
    /// The line also contains at least one covered node
    pub partial: bool,
    /// Text of the line
    pub source: String,
    /// Uncovered ranges, sorted by start column
    pub missing: Vec<MissingRange>,
}

/// Line coverage keyed by 1-based line number.
pub type LineCoverageMap = BTreeMap<usize, LineCoverageEntry>;

/// Length of a zero-based line in characters; 0 past the end of the source.
fn line_length(lines: &[&str], line: usize) -> usize {
    lines.get(line).map_or(0, |text| text.chars().count())
}

/// Split multi-line missing nodes into single-line fragments.
///
/// The first line runs from the node's start column to the end of the line,
/// the last line from column 0 to the node's end column, and every line in
/// between is covered entirely. Single-line nodes produce no fragments.
pub fn explode_nodes(missing: &[&ManifestNode], lines: &[&str]) -> Vec<NodeLocation> {
    let mut fragments = Vec::new();

    for node in missing.iter().filter(|n| n.location.is_multi_line()) {
        let loc = node.location;
        for line in loc.start_line..=loc.end_line {
            let (start_column, end_column) = if line == loc.start_line {
                (loc.start_column, line_length(lines, line))
            } else if line == loc.end_line {
                (0, loc.end_column)
            } else {
                (0, line_length(lines, line))
            };
            fragments.push(NodeLocation::single_line(line, start_column, end_column));
        }
    }

    fragments
}

/// Build the per-line coverage map from the missing and seen nodes of a file.
///
/// A line is `partial` when some seen node starts on it. Only one missing
/// range is reported per start column on a line; under the
/// `(line, start column, end column)` ordering the narrowest range wins.
pub fn build_line_coverage(
    missing: &[&ManifestNode],
    seen: &[&ManifestNode],
    lines: &[&str],
) -> LineCoverageMap {
    let seen_lines: HashSet<usize> = seen.iter().map(|n| n.location.start_line).collect();

    let mut candidates: Vec<NodeLocation> = missing.iter().map(|n| n.location).collect();
    candidates.extend(explode_nodes(missing, lines));
    candidates.sort_by_key(|loc| (loc.start_line, loc.start_column, loc.end_column));

    let mut kept_columns: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut coverage = LineCoverageMap::new();

    for loc in candidates.into_iter().filter(|loc| !loc.is_multi_line()) {
        if !kept_columns
            .entry(loc.start_line)
            .or_default()
            .insert(loc.start_column)
        {
            continue;
        }

        let range = MissingRange {
            start_column: loc.start_column,
            end_column: loc.end_column,
        };
        coverage
            .entry(loc.start_line + 1)
            .or_insert_with(|| LineCoverageEntry {
                partial: seen_lines.contains(&loc.start_line),
                source: lines.get(loc.start_line).copied().unwrap_or_default().to_string(),
                missing: Vec::new(),
            })
            .missing
            .push(range);
    }

    coverage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, location: NodeLocation) -> ManifestNode {
        ManifestNode::new(id, location)
    }

    #[test]
    fn test_explode_three_line_node() {
        let lines = ["a", "b", "c", "0123456789", "01234567", "012345"];
        let multi = node(0, NodeLocation::new(3, 4, 5, 2));

        let fragments = explode_nodes(&[&multi], &lines);

        assert_eq!(
            fragments,
            vec![
                NodeLocation::single_line(3, 4, 10),
                NodeLocation::single_line(4, 0, 8),
                NodeLocation::single_line(5, 0, 2),
            ]
        );
    }

    #[test]
    fn test_explode_skips_single_line_nodes() {
        let lines = ["let x = 1;"];
        let single = node(0, NodeLocation::single_line(0, 0, 10));
        assert!(explode_nodes(&[&single], &lines).is_empty());
    }

    #[test]
    fn test_explode_counts_characters() {
        let lines = ["é = \"ü\";", "x"];
        let multi = node(0, NodeLocation::new(0, 2, 1, 1));
        let fragments = explode_nodes(&[&multi], &lines);
        assert_eq!(fragments[0], NodeLocation::single_line(0, 2, 8));
    }

    #[test]
    fn test_explode_past_end_of_source() {
        let lines = ["only"];
        let multi = node(0, NodeLocation::new(0, 1, 2, 3));
        let fragments = explode_nodes(&[&multi], &lines);
        assert_eq!(fragments[1], NodeLocation::single_line(1, 0, 0));
        assert_eq!(fragments[2], NodeLocation::single_line(2, 0, 3));
    }

    #[test]
    fn test_dedup_same_start_column() {
        let lines = ["foo(bar(baz));"];
        let wide = node(0, NodeLocation::single_line(0, 4, 12));
        let narrow = node(1, NodeLocation::single_line(0, 4, 7));

        let coverage = build_line_coverage(&[&wide, &narrow], &[], &lines);

        let entry = &coverage[&1];
        assert_eq!(
            entry.missing,
            vec![MissingRange {
                start_column: 4,
                end_column: 7
            }]
        );
    }

    #[test]
    fn test_multiple_ranges_on_one_line() {
        let lines = ["a(); b(); c();"];
        let second = node(1, NodeLocation::single_line(0, 10, 14));
        let first = node(0, NodeLocation::single_line(0, 5, 9));
        let covered = node(2, NodeLocation::single_line(0, 0, 4));

        let coverage = build_line_coverage(&[&second, &first], &[&covered], &lines);

        assert_eq!(coverage.len(), 1);
        let entry = &coverage[&1];
        assert!(entry.partial);
        assert_eq!(entry.source, "a(); b(); c();");
        let starts: Vec<usize> = entry.missing.iter().map(|r| r.start_column).collect();
        assert_eq!(starts, vec![5, 10]);
    }

    #[test]
    fn test_multi_line_node_reported_per_line() {
        let lines = ["if (x) {", "  y();", "}"];
        let block = node(0, NodeLocation::new(0, 7, 2, 1));
        let condition = node(1, NodeLocation::single_line(0, 0, 6));

        let coverage = build_line_coverage(&[&block], &[&condition], &lines);

        assert_eq!(coverage.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(coverage[&1].partial);
        assert!(!coverage[&2].partial);
        assert_eq!(
            coverage[&1].missing,
            vec![MissingRange {
                start_column: 7,
                end_column: 8
            }]
        );
        assert_eq!(
            coverage[&2].missing,
            vec![MissingRange {
                start_column: 0,
                end_column: 6
            }]
        );
        assert_eq!(coverage[&3].source, "}");
    }

    #[test]
    fn test_fragment_and_single_line_node_share_column() {
        let lines = ["f(", "  1);"];
        let call = node(0, NodeLocation::new(0, 0, 1, 5));
        let callee = node(1, NodeLocation::single_line(0, 0, 1));

        let coverage = build_line_coverage(&[&call, &callee], &[], &lines);

        // callee (0..1) sorts before the fragment (0..2) and wins the column
        assert_eq!(
            coverage[&1].missing,
            vec![MissingRange {
                start_column: 0,
                end_column: 1
            }]
        );
    }

    #[test]
    fn test_no_missing_nodes() {
        let lines = ["x"];
        let covered = node(0, NodeLocation::single_line(0, 0, 1));
        assert!(build_line_coverage(&[], &[&covered], &lines).is_empty());
    }
}
