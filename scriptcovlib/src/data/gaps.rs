//! Gap analysis: which nodes and blocks never ran.
//!
//! Everything here is a pure function of the manifest and the recorder state
//! at call time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::manifest::{BlockLayout, InstrumentationManifest, ManifestNode};
use crate::data::recorder::CoverageRecorder;

/// Seen/missing totals for nodes or blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageTotals {
    pub total: usize,
    pub seen: usize,
    pub missing: usize,
    /// `seen / total` in `[0, 1]`; 1.0 when there is nothing to cover
    pub percentage: f64,
}

impl CoverageTotals {
    /// Build totals from a seen count, clamping `seen` to `total`.
    pub fn new(total: usize, seen: usize) -> Self {
        let seen = seen.min(total);
        Self {
            total,
            seen,
            missing: total - seen,
            percentage: ratio(seen, total),
        }
    }
}

/// Block-level coverage.
pub type BlockStats = CoverageTotals;

/// Node-level coverage.
pub type NodeStats = CoverageTotals;

/// Guarded `part / whole`.
///
/// A zero denominator means there is nothing to cover and counts as fully
/// covered. Equal operands yield exactly 1.0.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 || part >= whole {
        1.0
    } else {
        part as f64 / whole as f64
    }
}

/// Manifest nodes that were never visited, in manifest order.
pub fn missing<'m>(
    manifest: &'m InstrumentationManifest,
    recorder: &CoverageRecorder,
) -> Vec<&'m ManifestNode> {
    manifest
        .nodes()
        .iter()
        .filter(|node| !recorder.has_visited(node.id))
        .collect()
}

/// Manifest nodes visited at least once, in manifest order.
pub fn seen<'m>(
    manifest: &'m InstrumentationManifest,
    recorder: &CoverageRecorder,
) -> Vec<&'m ManifestNode> {
    manifest
        .nodes()
        .iter()
        .filter(|node| recorder.has_visited(node.id))
        .collect()
}

/// Node-level totals.
pub fn node_stats(manifest: &InstrumentationManifest, recorder: &CoverageRecorder) -> NodeStats {
    let seen = manifest
        .nodes()
        .iter()
        .filter(|node| recorder.has_visited(node.id))
        .count();
    CoverageTotals::new(manifest.len(), seen)
}

/// Block-level totals under the manifest's block layout.
///
/// With instrumentor-assigned indices, a block counts as seen when its index
/// was entered; indices outside `0..count` are ignored. With parent-span
/// grouping, a block counts as seen when any of its nodes was visited.
pub fn block_stats(manifest: &InstrumentationManifest, recorder: &CoverageRecorder) -> BlockStats {
    let total = manifest.block_count();
    let seen = match (manifest.layout(), manifest.block_map()) {
        (BlockLayout::Indexed { count }, _) => recorder
            .visited_blocks()
            .filter(|&index| index < count)
            .count(),
        (BlockLayout::ParentSpans, Some(map)) => manifest
            .nodes()
            .iter()
            .filter(|node| recorder.has_visited(node.id))
            .filter_map(|node| map.block_of(node.id))
            .collect::<HashSet<_>>()
            .len(),
        (BlockLayout::ParentSpans, None) => 0,
    };
    CoverageTotals::new(total, seen)
}
