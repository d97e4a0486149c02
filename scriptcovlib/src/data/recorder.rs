//! Visit counters fed by instrumented code.
//!
//! The instrumentor injects direct calls to [`CoverageRecorder::visit_node`]
//! and [`CoverageRecorder::visit_block`] at its call sites. Counters are
//! created lazily on the first visit.
//!
//! Increments are plain additions behind `&mut self`. One recorder belongs to
//! one file; concurrent executions of the same file's instrumented code must
//! share it through external synchronization (e.g. a `Mutex`).

use std::collections::HashMap;

use crate::data::manifest::NodeId;

/// Per-file visit counts for nodes and blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecorder {
    nodes: HashMap<NodeId, u64>,
    blocks: HashMap<usize, u64>,
}

impl CoverageRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that a node has been visited.
    ///
    /// Ids unknown to the manifest are accepted and never reported.
    pub fn visit_node(&mut self, id: NodeId) {
        *self.nodes.entry(id).or_insert(0) += 1;
    }

    /// Note that a block has been entered.
    pub fn visit_block(&mut self, index: usize) {
        *self.blocks.entry(index).or_insert(0) += 1;
    }

    /// Add `count` visits to a node at once, saturating at `u64::MAX`.
    ///
    /// A zero count leaves the node unvisited.
    pub fn record_node(&mut self, id: NodeId, count: u64) {
        if count > 0 {
            let entry = self.nodes.entry(id).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    /// Add `count` entries to a block at once, saturating at `u64::MAX`.
    pub fn record_block(&mut self, index: usize, count: u64) {
        if count > 0 {
            let entry = self.blocks.entry(index).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    /// Number of visits recorded for a node (0 if never visited).
    pub fn node_count(&self, id: NodeId) -> u64 {
        self.nodes.get(&id).copied().unwrap_or(0)
    }

    /// Number of visits recorded for a block (0 if never visited).
    pub fn block_count(&self, index: usize) -> u64 {
        self.blocks.get(&index).copied().unwrap_or(0)
    }

    /// Whether the node has been visited at least once.
    pub fn has_visited(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether the block has been entered at least once.
    pub fn has_visited_block(&self, index: usize) -> bool {
        self.blocks.contains_key(&index)
    }

    /// Indices of every block entered at least once, in no particular order.
    pub fn visited_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.keys().copied()
    }

    /// Number of distinct nodes visited, including ids outside the manifest.
    pub fn distinct_nodes(&self) -> usize {
        self.nodes.len()
    }
}
