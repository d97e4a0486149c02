//! Coverage collection and aggregation.
//!
//! This module holds the core of the crate:
//!
//! - **Manifest**: the static list of instrumentable nodes (`InstrumentationManifest`)
//! - **Recorder**: visit counters fed by instrumented code (`CoverageRecorder`)
//! - **Gaps**: missing/seen nodes and block totals
//! - **Lines**: multi-line explosion and the per-line coverage map
//! - **Stats**: the per-file statistics snapshot (`CoverageStats`)
//! - **Sessions**: per-file context and the run that owns them
//! - **Dumps**: the JSON exchange format written by the runtime
//!
//! ## Example
//!
//! ```rust
//! use scriptcovlib::data::{CoverageSession, InstrumentationManifest, ManifestNode, NodeLocation};
//!
//! let manifest = InstrumentationManifest::indexed(
//!     vec![
//!         ManifestNode::new(0, NodeLocation::single_line(0, 0, 4)),
//!         ManifestNode::new(1, NodeLocation::single_line(1, 0, 4)),
//!     ],
//!     1,
//! )
//! .unwrap();
//!
//! let mut session = CoverageSession::new("a.js", manifest, "a();\nb();");
//! session.visit_node(0);
//! session.visit_block(0);
//!
//! let stats = session.stats_with_source("a();\nb();");
//! assert_eq!(stats.missing, 1);
//! assert_eq!(stats.lines[0].lineno, 2);
//! assert_eq!(stats.blocks.percentage, 1.0);
//! ```

pub mod dump;
pub mod gaps;
pub mod lines;
pub mod manifest;
pub mod recorder;
pub mod report;
pub mod session;
pub mod stats;

pub use dump::{load_session, CoverageDump};
pub use gaps::{block_stats, missing, node_stats, ratio, seen, BlockStats, CoverageTotals, NodeStats};
pub use lines::{build_line_coverage, explode_nodes, LineCoverageEntry, LineCoverageMap, MissingRange};
pub use manifest::{
    BlockKey, BlockLayout, BlockMap, InstrumentationManifest, ManifestNode, NodeId, NodeLocation,
    ParentSpan,
};
pub use recorder::CoverageRecorder;
pub use report::{collect_coverage, coverage_table, display_name, file_stats, render_report};
pub use session::{CoverageRun, CoverageSession};
pub use stats::{compute_stats, split_lines, CoverageStats, MissingLine};
