//! # scriptcovlib
//!
//! Source-level coverage aggregation for instrumented scripts.
//!
//! ## Overview
//!
//! An external loader rewrites each script it loads so that running it reports
//! which syntactic nodes executed. This library takes those visit events plus
//! the static list of instrumentable nodes and derives:
//!
//! - **Missing nodes**: manifest nodes that never ran
//! - **Block coverage**: coarser statement-group coverage
//! - **Line coverage**: a per-line map of uncovered column ranges, handling
//!   nodes that span lines, several nodes per line, and partially covered lines
//!
//! Results are packaged in a [`CoverageStats`] snapshot and rendered by
//! pluggable reporters (table, JSON, plain text).
//!
//! ## Pipeline
//!
//! 1. **source**: find coverage dumps on disk
//! 2. **data**: load them into sessions and compute statistics
//! 3. **output**: format the statistics
//!
//! ## Example
//!
//! ```rust
//! use scriptcovlib::{CoverageRun, CoverageSession, InstrumentationManifest, ManifestNode, NodeLocation};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let path = dir.path().join("a.js");
//! let source = "if (x) {\n  y();\n}";
//! fs::write(&path, source).unwrap();
//!
//! let manifest = InstrumentationManifest::indexed(
//!     vec![
//!         ManifestNode::new(0, NodeLocation::single_line(0, 4, 5)),
//!         ManifestNode::new(1, NodeLocation::new(0, 7, 2, 1)),
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! let mut run = CoverageRun::new();
//! let session = run.register(CoverageSession::new(&path, manifest, source));
//! session.visit_node(0);
//! session.visit_block(0);
//!
//! let stats = run.session(&path).unwrap().stats().unwrap();
//! assert_eq!(stats.missing, 1);
//! assert!(stats.coverage[&1].partial);
//! assert_eq!(stats.coverage.len(), 3);
//! ```

pub mod data;
pub mod error;
pub mod options;
pub mod output;
pub mod source;

pub use data::{
    collect_coverage, compute_stats, load_session, render_report, BlockLayout, BlockStats,
    CoverageDump, CoverageRecorder, CoverageRun, CoverageSession, CoverageStats, CoverageTotals,
    InstrumentationManifest, LineCoverageEntry, LineCoverageMap, ManifestNode, MissingLine,
    MissingRange, NodeId, NodeLocation, NodeStats, ParentSpan,
};
pub use error::ScriptcovError;
pub use options::{ReportOptions, SortBy};
pub use output::{CoverageTable, Reporter, ReporterKind};
pub use source::FilterConfig;

/// Result type for scriptcovlib operations
pub type Result<T> = std::result::Result<T, ScriptcovError>;
