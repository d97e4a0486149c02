//! Table-ready data structures for the coverage summary.
//!
//! `CoverageTable` holds formatted strings only: one row per file with
//! line and block coverage, plus a totals footer. Rendering to text is a
//! matter of padding the columns; callers that want colour pass a styling
//! closure to [`CoverageTable::render_with`].

use serde::{Deserialize, Serialize};

use crate::data::gaps::ratio;
use crate::data::stats::CoverageStats;

/// Maximum display width of a filename in the table.
pub const MAX_FILENAME_LENGTH: usize = 60;

const ELLIPSIS: char = '…';

/// Shorten a filename to fit the table, keeping its trailing portion.
///
/// Names longer than [`MAX_FILENAME_LENGTH`] characters become an ellipsis
/// followed by their last `MAX_FILENAME_LENGTH - 2` characters.
pub fn truncate_filename(name: &str) -> String {
    let len = name.chars().count();
    if len > MAX_FILENAME_LENGTH {
        let keep = MAX_FILENAME_LENGTH - 2;
        let tail: String = name.chars().skip(len - keep).collect();
        format!("{ELLIPSIS}{tail}")
    } else {
        name.to_string()
    }
}

/// Format a coverage fraction as a whole, floored percentage (e.g. `"66%"`).
pub fn format_percentage(fraction: f64) -> String {
    format!("{}%", (fraction * 100.0).floor() as i64)
}

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (file name or "Total (N files)")
    pub label: String,
    /// `[lines%, missing lines, total lines, blocks%, missing blocks, total blocks]`
    pub values: Vec<String>,
    /// Raw line coverage, for styling
    pub line_percentage: f64,
    /// Raw block coverage, for styling
    pub block_percentage: f64,
}

impl TableRow {
    fn new(
        label: String,
        line_percentage: f64,
        (missing_lines, total_lines): (usize, usize),
        block_percentage: f64,
        (missing_blocks, total_blocks): (usize, usize),
    ) -> Self {
        TableRow {
            label,
            values: vec![
                format_percentage(line_percentage),
                missing_lines.to_string(),
                total_lines.to_string(),
                format_percentage(block_percentage),
                missing_blocks.to_string(),
                total_blocks.to_string(),
            ],
            line_percentage,
            block_percentage,
        }
    }

    /// Row for one file.
    pub fn from_stats(filename: &str, stats: &CoverageStats) -> Self {
        Self::new(
            truncate_filename(filename),
            stats.percentage,
            (stats.missing, stats.total),
            stats.blocks.percentage,
            (stats.blocks.missing, stats.blocks.total),
        )
    }
}

/// What a rendered cell represents, for styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRole {
    Header,
    Label,
    Value,
    /// A percentage cell with its raw fraction
    Percentage(f64),
    Separator,
}

/// Table-ready coverage summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageTable {
    /// Column headers: `[File, Lines, Missing, Total, Blocks, Missing, Total]`
    pub headers: Vec<String>,
    /// One row per file
    pub rows: Vec<TableRow>,
    /// Totals over all rows
    pub footer: TableRow,
    #[serde(skip)]
    totals: Totals,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    seen_lines: usize,
    missing_lines: usize,
    total_lines: usize,
    seen_blocks: usize,
    missing_blocks: usize,
    total_blocks: usize,
}

impl Default for CoverageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        let totals = Totals::default();
        CoverageTable {
            headers: ["File", "Lines", "Missing", "Total", "Blocks", "Missing", "Total"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: Vec::new(),
            footer: footer_row(0, &totals),
            totals,
        }
    }

    /// Append a file's row and update the footer.
    pub fn push(&mut self, filename: &str, stats: &CoverageStats) {
        self.rows.push(TableRow::from_stats(filename, stats));
        self.totals.seen_lines += stats.seen;
        self.totals.missing_lines += stats.missing;
        self.totals.total_lines += stats.total;
        self.totals.seen_blocks += stats.blocks.seen;
        self.totals.missing_blocks += stats.blocks.missing;
        self.totals.total_blocks += stats.blocks.total;
        self.footer = footer_row(self.rows.len(), &self.totals);
    }

    /// Render as aligned plain text.
    pub fn render(&self) -> String {
        self.render_with(|_, text| text.to_string())
    }

    /// Render as aligned text, passing every padded cell through `style`.
    pub fn render_with(&self, style: impl Fn(CellRole, &str) -> String) -> String {
        let label_width = std::iter::once(&self.headers[0])
            .chain(self.rows.iter().map(|r| &r.label))
            .chain(std::iter::once(&self.footer.label))
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);

        let value_widths: Vec<usize> = (1..self.headers.len())
            .map(|col| {
                std::iter::once(self.headers[col].chars().count())
                    .chain(
                        self.rows
                            .iter()
                            .chain(std::iter::once(&self.footer))
                            .map(|r| r.values[col - 1].chars().count()),
                    )
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line_width = label_width + value_widths.iter().map(|w| w + 2).sum::<usize>();
        let separator = style(CellRole::Separator, &"-".repeat(line_width));

        let mut out = String::new();

        let mut header = style(CellRole::Header, &format!("{:<label_width$}", self.headers[0]));
        for (name, width) in self.headers[1..].iter().zip(value_widths.iter().copied()) {
            header.push_str("  ");
            header.push_str(&style(CellRole::Header, &format!("{name:>width$}")));
        }
        out.push_str(header.trim_end());
        out.push('\n');
        out.push_str(&separator);
        out.push('\n');

        let render_row = |row: &TableRow| {
            let mut line = style(CellRole::Label, &format!("{:<label_width$}", row.label));
            for (col, (value, width)) in row.values.iter().zip(value_widths.iter().copied()).enumerate() {
                let role = match col {
                    0 => CellRole::Percentage(row.line_percentage),
                    3 => CellRole::Percentage(row.block_percentage),
                    _ => CellRole::Value,
                };
                line.push_str("  ");
                line.push_str(&style(role, &format!("{value:>width$}")));
            }
            line
        };

        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out.push_str(&separator);
        out.push('\n');
        out.push_str(&render_row(&self.footer));
        out.push('\n');

        out
    }
}

/// Footer row. Seen counts are summed per file; a file whose source shrank
/// after instrumentation can report more missing lines than it has.
fn footer_row(file_count: usize, totals: &Totals) -> TableRow {
    TableRow::new(
        format!("Total ({} files)", file_count),
        ratio(totals.seen_lines, totals.total_lines),
        (totals.missing_lines, totals.total_lines),
        ratio(totals.seen_blocks, totals.total_blocks),
        (totals.missing_blocks, totals.total_blocks),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gaps::CoverageTotals;
    use crate::data::lines::LineCoverageMap;

    fn stats(missing: usize, total: usize, blocks_seen: usize, blocks_total: usize) -> CoverageStats {
        CoverageStats {
            percentage: ratio(total - missing, total),
            lines: vec![],
            missing,
            seen: total - missing,
            total,
            coverage: LineCoverageMap::new(),
            source: String::new(),
            nodes: CoverageTotals::new(0, 0),
            blocks: CoverageTotals::new(blocks_total, blocks_seen),
        }
    }

    #[test]
    fn test_truncate_long_filename() {
        let name: String = ('a'..='z').cycle().take(70).collect();
        let truncated = truncate_filename(&name);

        assert_eq!(truncated.chars().next(), Some('…'));
        assert_eq!(truncated.chars().count(), 59);
        assert_eq!(&truncated['…'.len_utf8()..], &name[12..]);
    }

    #[test]
    fn test_truncate_keeps_short_filename() {
        let name = "lib/a.js";
        assert_eq!(truncate_filename(name), name);
        let exact: String = "x".repeat(MAX_FILENAME_LENGTH);
        assert_eq!(truncate_filename(&exact), exact);
    }

    #[test]
    fn test_format_percentage_floors() {
        assert_eq!(format_percentage(2.0 / 3.0), "66%");
        assert_eq!(format_percentage(1.0), "100%");
        assert_eq!(format_percentage(0.0), "0%");
        assert_eq!(format_percentage(0.999), "99%");
    }

    #[test]
    fn test_row_from_stats() {
        let row = TableRow::from_stats("lib/a.js", &stats(2, 4, 3, 4));
        assert_eq!(row.label, "lib/a.js");
        assert_eq!(row.values, vec!["50%", "2", "4", "75%", "1", "4"]);
    }

    #[test]
    fn test_footer_aggregates_rows() {
        let mut table = CoverageTable::new();
        table.push("a.js", &stats(1, 4, 1, 2));
        table.push("b.js", &stats(0, 4, 2, 2));

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.footer.label, "Total (2 files)");
        assert_eq!(table.footer.values, vec!["87%", "1", "8", "75%", "1", "4"]);
    }

    #[test]
    fn test_footer_with_source_shorter_than_manifest() {
        use crate::data::manifest::{InstrumentationManifest, ManifestNode, NodeLocation};
        use crate::data::recorder::CoverageRecorder;
        use crate::data::stats::compute_stats;

        let nodes = (0..4)
            .map(|line| ManifestNode::new(line as u64, NodeLocation::single_line(line, 0, 4)))
            .collect();
        let manifest = InstrumentationManifest::indexed(nodes, 1).unwrap();
        let shrunk = compute_stats(&manifest, &CoverageRecorder::new(), &["a();"], "a();");
        assert_eq!((shrunk.missing, shrunk.total, shrunk.seen), (4, 1, 0));

        let mut table = CoverageTable::new();
        table.push("shrunk.js", &shrunk);
        table.push("b.js", &stats(0, 3, 1, 1));

        assert_eq!(table.footer.values, vec!["75%", "4", "4", "50%", "1", "2"]);
    }

    #[test]
    fn test_empty_table_footer() {
        let table = CoverageTable::new();
        assert_eq!(table.footer.values, vec!["100%", "0", "0", "100%", "0", "0"]);
    }

    #[test]
    fn test_render_aligns_columns() {
        let mut table = CoverageTable::new();
        table.push("lib/a.js", &stats(1, 4, 1, 2));

        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("File"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].starts_with("lib/a.js"));
        assert!(lines[2].contains("75%"));
        assert!(lines[4].starts_with("Total (1 files)"));
        assert_eq!(lines[2].chars().count(), lines[4].chars().count());
    }

    #[test]
    fn test_render_with_style_sees_percentages() {
        let mut table = CoverageTable::new();
        table.push("a.js", &stats(2, 4, 0, 0));

        let text = table.render_with(|role, cell| match role {
            CellRole::Percentage(p) if p < 0.6 => format!("<{}>", cell.trim()),
            _ => cell.to_string(),
        });
        assert!(text.contains("<50%>"));
    }
}
