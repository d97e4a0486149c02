//! Coverage dumps written by the instrumenting runtime.
//!
//! A dump is a JSON document holding one file's manifest and the visit
//! counters collected while it ran:
//!
//! ```json
//! {
//!   "filename": "lib/a.js",
//!   "source": "var a = 1;\n",
//!   "nodes": [{"id": 0, "start_line": 0, "start_column": 0, "end_line": 0, "end_column": 10}],
//!   "block_count": 1,
//!   "node_visits": {"0": 3},
//!   "block_visits": {"0": 1}
//! }
//! ```
//!
//! Without `block_count`, blocks are derived from the nodes' `parent` spans.
//! A relative `filename` is resolved against the directory holding the dump.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::manifest::{BlockLayout, InstrumentationManifest, ManifestNode, NodeId};
use crate::data::session::CoverageSession;
use crate::error::ScriptcovError;
use crate::Result;

/// On-disk representation of one file's coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDump {
    pub filename: PathBuf,
    #[serde(default)]
    pub source: Option<String>,
    pub nodes: Vec<ManifestNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_count: Option<usize>,
    #[serde(default)]
    pub node_visits: BTreeMap<NodeId, u64>,
    #[serde(default)]
    pub block_visits: BTreeMap<usize, u64>,
}

impl CoverageDump {
    /// Parse a dump from JSON text. `origin` is only used in error messages.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ScriptcovError::InvalidDump {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a dump file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ScriptcovError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text, path)
    }

    /// Snapshot a live session into a dump.
    pub fn from_session(session: &CoverageSession) -> Self {
        let manifest = session.manifest();
        let recorder = session.recorder();
        let block_count = match manifest.layout() {
            BlockLayout::Indexed { count } => Some(count),
            BlockLayout::ParentSpans => None,
        };

        let node_visits = manifest
            .nodes()
            .iter()
            .filter(|n| recorder.has_visited(n.id))
            .map(|n| (n.id, recorder.node_count(n.id)))
            .collect();
        let block_visits = recorder
            .visited_blocks()
            .map(|index| (index, recorder.block_count(index)))
            .collect();

        Self {
            filename: session.filename().to_path_buf(),
            source: Some(session.source().to_string()),
            nodes: manifest.nodes().to_vec(),
            block_count,
            node_visits,
            block_visits,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild the session, replaying recorded visits.
    ///
    /// `base_dir` anchors a relative `filename`.
    pub fn into_session(self, base_dir: &Path) -> Result<CoverageSession> {
        let layout = match self.block_count {
            Some(count) => BlockLayout::Indexed { count },
            None => BlockLayout::ParentSpans,
        };
        let manifest = InstrumentationManifest::new(self.nodes, layout)?;

        let filename = if self.filename.is_absolute() {
            self.filename
        } else {
            base_dir.join(self.filename)
        };

        let mut session = CoverageSession::new(filename, manifest, self.source.unwrap_or_default());
        for (id, count) in self.node_visits {
            session.record_node(id, count);
        }
        for (index, count) in self.block_visits {
            session.record_block(index, count);
        }
        Ok(session)
    }
}

/// Load a dump file into a session.
pub fn load_session(path: impl AsRef<Path>) -> Result<CoverageSession> {
    let path = path.as_ref();
    let dump = CoverageDump::read(path)?;
    tracing::debug!(
        dump = %path.display(),
        file = %dump.filename.display(),
        nodes = dump.nodes.len(),
        "loaded coverage dump"
    );
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    dump.into_session(base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::manifest::NodeLocation;
    use tempfile::tempdir;

    const DUMP: &str = r#"{
        "filename": "a.js",
        "source": "a();\nb();",
        "nodes": [
            {"id": 0, "start_line": 0, "start_column": 0, "end_line": 0, "end_column": 4},
            {"id": 1, "start_line": 1, "start_column": 0, "end_line": 1, "end_column": 4}
        ],
        "block_count": 2,
        "node_visits": {"0": 3},
        "block_visits": {"0": 1}
    }"#;

    #[test]
    fn test_into_session_replays_visits() {
        let dump = CoverageDump::from_json(DUMP, Path::new("a.cov.json")).unwrap();
        let session = dump.into_session(Path::new("/project")).unwrap();

        assert_eq!(session.filename(), Path::new("/project/a.js"));
        assert_eq!(session.recorder().node_count(0), 3);
        assert_eq!(session.recorder().block_count(0), 1);
        assert_eq!(session.missing().len(), 1);
        assert_eq!(session.blocks().total, 2);
    }

    #[test]
    fn test_hot_loop_counts_load_directly() {
        let json = r#"{
            "filename": "hot.js",
            "nodes": [
                {"id": 0, "start_line": 0, "start_column": 0, "end_line": 0, "end_column": 4},
                {"id": 1, "start_line": 1, "start_column": 0, "end_line": 1, "end_column": 4}
            ],
            "block_count": 1,
            "node_visits": {"0": 10000000000, "1": 0},
            "block_visits": {"0": 10000000000}
        }"#;
        let started = std::time::Instant::now();
        let dump = CoverageDump::from_json(json, Path::new("hot.cov.json")).unwrap();
        let session = dump.into_session(Path::new("/project")).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(session.recorder().node_count(0), 10_000_000_000);
        assert_eq!(session.recorder().block_count(0), 10_000_000_000);
        assert!(!session.recorder().has_visited(1));
        assert_eq!(session.missing().len(), 1);
    }

    #[test]
    fn test_missing_block_count_groups_by_parent() {
        let json = r#"{
            "filename": "/abs/b.js",
            "nodes": [
                {"id": 0, "start_line": 0, "start_column": 0, "end_line": 0, "end_column": 4},
                {"id": 1, "start_line": 1, "start_column": 2, "end_line": 1, "end_column": 6,
                 "parent": {"start_line": 0, "start_column": 9, "end_line": 2, "end_column": 1, "label": "block"}}
            ]
        }"#;
        let dump = CoverageDump::from_json(json, Path::new("b.cov.json")).unwrap();
        let session = dump.into_session(Path::new("/elsewhere")).unwrap();

        assert_eq!(session.filename(), Path::new("/abs/b.js"));
        assert_eq!(session.manifest().layout(), BlockLayout::ParentSpans);
        assert_eq!(session.blocks().total, 2);
        assert_eq!(session.source(), "");
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let err = CoverageDump::from_json("{not json", Path::new("bad.cov.json")).unwrap_err();
        match err {
            ScriptcovError::InvalidDump { path, .. } => assert_eq!(path, PathBuf::from("bad.cov.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected_on_load() {
        let json = r#"{
            "filename": "c.js",
            "nodes": [
                {"id": 4, "start_line": 0, "start_column": 0, "end_line": 0, "end_column": 1},
                {"id": 4, "start_line": 1, "start_column": 0, "end_line": 1, "end_column": 1}
            ]
        }"#;
        let dump = CoverageDump::from_json(json, Path::new("c.cov.json")).unwrap();
        assert!(matches!(
            dump.into_session(Path::new(".")),
            Err(ScriptcovError::DuplicateNodeId(4))
        ));
    }

    #[test]
    fn test_load_session_resolves_against_dump_dir() {
        let temp = tempdir().unwrap();
        let dump_path = temp.path().join("a.cov.json");
        fs::write(&dump_path, DUMP).unwrap();
        fs::write(temp.path().join("a.js"), "a();\nb();").unwrap();

        let session = load_session(&dump_path).unwrap();
        let stats = session.stats().unwrap();

        assert_eq!(session.filename(), temp.path().join("a.js"));
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.lines[0].lineno, 2);
    }

    #[test]
    fn test_session_round_trip_keeps_counts() {
        let manifest = InstrumentationManifest::indexed(
            vec![ManifestNode::new(9, NodeLocation::single_line(0, 0, 3))],
            1,
        )
        .unwrap();
        let mut session = CoverageSession::new("/x/d.js", manifest, "d()");
        session.visit_node(9);
        session.visit_node(9);
        session.visit_node(77);

        let dump = CoverageDump::from_session(&session);
        assert_eq!(dump.node_visits.get(&9), Some(&2));
        // Visits outside the manifest are not persisted
        assert!(!dump.node_visits.contains_key(&77));

        let text = dump.to_json().unwrap();
        let restored = CoverageDump::from_json(&text, Path::new("d.cov.json"))
            .unwrap()
            .into_session(Path::new("/"))
            .unwrap();
        assert_eq!(restored.recorder().node_count(9), 2);
    }
}
