//! Terminal rendering for the summary table

use console::Style;
use scriptcovlib::output::{CellRole, CoverageTable};

/// Coverage at or above this fraction is shown as good.
const GOOD_COVERAGE: f64 = 0.8;
/// Coverage below this fraction is shown as poor.
const POOR_COVERAGE: f64 = 0.5;

/// Pick the style for a table cell.
fn cell_style(role: CellRole) -> Style {
    match role {
        CellRole::Header => Style::new().bold(),
        CellRole::Separator => Style::new().dim(),
        CellRole::Percentage(p) if p >= GOOD_COVERAGE => Style::new().green(),
        CellRole::Percentage(p) if p < POOR_COVERAGE => Style::new().red(),
        CellRole::Percentage(_) => Style::new().yellow(),
        CellRole::Label | CellRole::Value => Style::new(),
    }
}

/// Render the table with colours.
///
/// `console` drops the escape codes when stdout is not a terminal.
pub fn render_table(table: &CoverageTable) -> String {
    table.render_with(|role, text| cell_style(role).apply_to(text).to_string())
}
