//! Instrumentation manifest: the static list of instrumentable nodes.
//!
//! The manifest is produced once per file by the external instrumentor and
//! stays read-only for the whole coverage session. Every node carries a stable
//! id and a zero-based source span. Nodes may also carry the span of their
//! enclosing syntactic parent, which is used to derive block identity when the
//! instrumentor does not assign block indices itself.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ScriptcovError;
use crate::Result;

/// Stable identifier of an instrumentable node, unique within a file.
pub type NodeId = u64;

/// A zero-based source span. Columns are measured in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLocation {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl NodeLocation {
    /// Create a location from its four coordinates.
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Create a location that starts and ends on the same line.
    pub fn single_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(line, start_column, line, end_column)
    }

    /// Whether the span covers more than one line.
    pub fn is_multi_line(&self) -> bool {
        self.start_line < self.end_line
    }
}

/// The enclosing span of a node, as reported by the instrumentor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentSpan {
    #[serde(flatten)]
    pub location: NodeLocation,
    /// Syntactic label of the parent (e.g. `block`, `call`)
    #[serde(default)]
    pub label: String,
}

/// A statically known, instrumentable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub location: NodeLocation,
    /// Enclosing span; `None` for nodes that sit directly at file level
    #[serde(default)]
    pub parent: Option<ParentSpan>,
}

impl ManifestNode {
    /// Create a node without a parent span.
    pub fn new(id: NodeId, location: NodeLocation) -> Self {
        Self {
            id,
            location,
            parent: None,
        }
    }

    /// Builder: attach the enclosing span.
    pub fn with_parent(mut self, parent: ParentSpan) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// How block identity is derived for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockLayout {
    /// The instrumentor assigns indices `0..count` and emits block visits.
    Indexed { count: usize },
    /// Blocks are derived by grouping nodes that share a parent span.
    ParentSpans,
}

/// Grouping key for the parent-span block strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKey {
    /// Synthetic block for nodes without an enclosing span
    FileRoot,
    /// Nodes whose parents share span and label
    Span(ParentSpan),
}

impl BlockKey {
    fn of(node: &ManifestNode) -> Self {
        match &node.parent {
            Some(parent) => BlockKey::Span(parent.clone()),
            None => BlockKey::FileRoot,
        }
    }
}

/// Node-to-block assignment produced by grouping parent spans.
///
/// Block indices are handed out in manifest order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockMap {
    node_to_block: HashMap<NodeId, usize>,
    total: usize,
}

impl BlockMap {
    /// Group the given nodes by parent span.
    pub fn group_by_parent(nodes: &[ManifestNode]) -> Self {
        let mut keys: HashMap<BlockKey, usize> = HashMap::new();
        let mut node_to_block = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let next = keys.len();
            let block = *keys.entry(BlockKey::of(node)).or_insert(next);
            node_to_block.insert(node.id, block);
        }

        Self {
            node_to_block,
            total: keys.len(),
        }
    }

    /// Block index a node belongs to.
    pub fn block_of(&self, id: NodeId) -> Option<usize> {
        self.node_to_block.get(&id).copied()
    }

    /// Number of distinct blocks.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// The ordered list of instrumentable nodes for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationManifest {
    nodes: Vec<ManifestNode>,
    layout: BlockLayout,
    block_map: Option<BlockMap>,
}

impl InstrumentationManifest {
    /// Build a manifest, rejecting duplicate node ids.
    pub fn new(nodes: Vec<ManifestNode>, layout: BlockLayout) -> Result<Self> {
        let mut ids = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !ids.insert(node.id) {
                return Err(ScriptcovError::DuplicateNodeId(node.id));
            }
        }

        let block_map = match layout {
            BlockLayout::Indexed { .. } => None,
            BlockLayout::ParentSpans => Some(BlockMap::group_by_parent(&nodes)),
        };

        Ok(Self {
            nodes,
            layout,
            block_map,
        })
    }

    /// Manifest with instrumentor-assigned block indices.
    pub fn indexed(nodes: Vec<ManifestNode>, block_count: usize) -> Result<Self> {
        Self::new(nodes, BlockLayout::Indexed { count: block_count })
    }

    /// Manifest whose blocks are derived from parent spans.
    pub fn grouped(nodes: Vec<ManifestNode>) -> Result<Self> {
        Self::new(nodes, BlockLayout::ParentSpans)
    }

    /// Nodes in instrumentor order.
    pub fn nodes(&self) -> &[ManifestNode] {
        &self.nodes
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    /// Parent-span grouping, present only for [`BlockLayout::ParentSpans`].
    pub fn block_map(&self) -> Option<&BlockMap> {
        self.block_map.as_ref()
    }

    /// Total number of blocks under the manifest's layout.
    pub fn block_count(&self) -> usize {
        match (&self.layout, &self.block_map) {
            (BlockLayout::Indexed { count }, _) => *count,
            (BlockLayout::ParentSpans, Some(map)) => map.total(),
            (BlockLayout::ParentSpans, None) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
