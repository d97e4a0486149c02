//! Output formatting: present coverage statistics.
//!
//! - **Reporter**: the formatter trait, with `cli`, `json` and `plain` implementations
//! - **CoverageTable**: table-ready summary with headers, rows, and footer
//!
//! Reporters only format; every number comes from the stats snapshot.

pub mod reporter;
pub mod table;

pub use reporter::{CliReporter, JsonFileReport, JsonReporter, PlainReporter, Reporter, ReporterKind};
pub use table::{
    format_percentage, truncate_filename, CellRole, CoverageTable, TableRow, MAX_FILENAME_LENGTH,
};
