//! Coverage sessions: one per instrumented file, owned by a run.
//!
//! The loader creates a [`CoverageSession`] when it instruments a file and
//! registers it with the [`CoverageRun`] it was handed. Instrumented code then
//! reports visits straight to that session. Nothing here is process-global;
//! a fresh run starts from a fresh `CoverageRun`.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::gaps::{self, BlockStats};
use crate::data::manifest::{InstrumentationManifest, ManifestNode, NodeId};
use crate::data::recorder::CoverageRecorder;
use crate::data::stats::{compute_stats, split_lines, CoverageStats};
use crate::error::ScriptcovError;
use crate::Result;

/// Coverage state for a single instrumented file.
#[derive(Debug, Clone)]
pub struct CoverageSession {
    filename: PathBuf,
    manifest: InstrumentationManifest,
    recorder: CoverageRecorder,
    source: String,
}

impl CoverageSession {
    /// Start tracking a file.
    ///
    /// `source` is the text handed to the instrumentor.
    pub fn new(
        filename: impl Into<PathBuf>,
        manifest: InstrumentationManifest,
        source: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            manifest,
            recorder: CoverageRecorder::new(),
            source: source.into(),
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn manifest(&self) -> &InstrumentationManifest {
        &self.manifest
    }

    pub fn recorder(&self) -> &CoverageRecorder {
        &self.recorder
    }

    /// Source text as instrumented.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Record a node visit.
    pub fn visit_node(&mut self, id: NodeId) {
        self.recorder.visit_node(id);
    }

    /// Record a block visit.
    pub fn visit_block(&mut self, index: usize) {
        self.recorder.visit_block(index);
    }

    /// Record `count` visits of a node at once.
    pub fn record_node(&mut self, id: NodeId, count: u64) {
        self.recorder.record_node(id, count);
    }

    /// Record `count` entries of a block at once.
    pub fn record_block(&mut self, index: usize, count: u64) {
        self.recorder.record_block(index, count);
    }

    /// Nodes that never ran, in manifest order.
    pub fn missing(&self) -> Vec<&ManifestNode> {
        gaps::missing(&self.manifest, &self.recorder)
    }

    /// Nodes that ran at least once, in manifest order.
    pub fn seen(&self) -> Vec<&ManifestNode> {
        gaps::seen(&self.manifest, &self.recorder)
    }

    /// Block-level totals.
    pub fn blocks(&self) -> BlockStats {
        gaps::block_stats(&self.manifest, &self.recorder)
    }

    /// Compute statistics, reading the file's current text from disk.
    ///
    /// The file is read on every call; a missing file is an error.
    pub fn stats(&self) -> Result<CoverageStats> {
        let text = fs::read_to_string(&self.filename).map_err(|e| ScriptcovError::FileRead {
            path: self.filename.clone(),
            source: e,
        })?;
        Ok(self.stats_with_source(&text))
    }

    /// Compute statistics against text the caller already holds.
    pub fn stats_with_source(&self, text: &str) -> CoverageStats {
        let lines = split_lines(text);
        compute_stats(&self.manifest, &self.recorder, &lines, &self.source)
    }
}

/// All sessions of one coverage run, keyed by file path.
#[derive(Debug, Clone, Default)]
pub struct CoverageRun {
    sessions: BTreeMap<PathBuf, CoverageSession>,
}

impl CoverageRun {
    /// Create an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, replacing any previous session for the same file.
    pub fn register(&mut self, session: CoverageSession) -> &mut CoverageSession {
        tracing::debug!(
            path = %session.filename.display(),
            nodes = session.manifest.len(),
            "registered coverage session"
        );
        match self.sessions.entry(session.filename.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(session);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(session),
        }
    }

    pub fn session(&self, path: impl AsRef<Path>) -> Option<&CoverageSession> {
        self.sessions.get(path.as_ref())
    }

    pub fn session_mut(&mut self, path: impl AsRef<Path>) -> Option<&mut CoverageSession> {
        self.sessions.get_mut(path.as_ref())
    }

    /// Sessions in path order.
    pub fn sessions(&self) -> impl Iterator<Item = &CoverageSession> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Statistics for every session, in path order.
    pub fn stats(&self) -> Result<Vec<(PathBuf, CoverageStats)>> {
        self.sessions
            .values()
            .map(|s| Ok((s.filename.clone(), s.stats()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::manifest::NodeLocation;
    use std::fs;
    use tempfile::tempdir;

    const SOURCE: &str = "var a = 1;\nif (a) {\n  a++;\n}\n";

    fn manifest() -> InstrumentationManifest {
        InstrumentationManifest::indexed(
            vec![
                ManifestNode::new(0, NodeLocation::single_line(0, 0, 10)),
                ManifestNode::new(1, NodeLocation::single_line(1, 4, 5)),
                ManifestNode::new(2, NodeLocation::single_line(2, 2, 6)),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_session_stats_reads_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.js");
        fs::write(&path, SOURCE).unwrap();

        let mut session = CoverageSession::new(&path, manifest(), SOURCE);
        session.visit_node(0);
        session.visit_node(1);
        session.visit_block(0);

        let stats = session.stats().unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.lines[0].lineno, 3);
        assert_eq!(stats.blocks.seen, 1);
        assert_eq!(session.missing().len(), 1);
        assert_eq!(session.seen().len(), 2);
        assert_eq!(session.blocks().percentage, 0.5);
    }

    #[test]
    fn test_session_stats_missing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("gone.js");
        let session = CoverageSession::new(&path, manifest(), SOURCE);

        let err = session.stats().unwrap_err();
        match err {
            ScriptcovError::FileRead { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_keeps_sessions_separate() {
        let mut run = CoverageRun::new();
        run.register(CoverageSession::new("b.js", manifest(), SOURCE));
        run.register(CoverageSession::new("a.js", manifest(), SOURCE))
            .visit_node(2);

        assert_eq!(run.len(), 2);
        assert_eq!(run.session("a.js").unwrap().recorder().node_count(2), 1);
        assert_eq!(run.session("b.js").unwrap().recorder().node_count(2), 0);

        let names: Vec<&Path> = run.sessions().map(|s| s.filename()).collect();
        assert_eq!(names, vec![Path::new("a.js"), Path::new("b.js")]);
    }

    #[test]
    fn test_register_replaces_existing_session() {
        let mut run = CoverageRun::new();
        run.register(CoverageSession::new("a.js", manifest(), SOURCE))
            .visit_node(0);
        run.register(CoverageSession::new("a.js", manifest(), SOURCE));

        assert_eq!(run.len(), 1);
        assert!(!run.session("a.js").unwrap().recorder().has_visited(0));
    }

    #[test]
    fn test_run_stats_in_path_order() {
        let temp = tempdir().unwrap();
        let mut run = CoverageRun::new();
        for name in ["z.js", "m.js"] {
            let path = temp.path().join(name);
            fs::write(&path, SOURCE).unwrap();
            run.register(CoverageSession::new(path, manifest(), SOURCE));
        }
        run.session_mut(temp.path().join("m.js"))
            .unwrap()
            .visit_node(0);

        let stats = run.stats().unwrap();
        assert_eq!(stats.len(), 2);
        assert!(stats[0].0.ends_with("m.js"));
        assert_eq!(stats[0].1.missing, 2);
        assert_eq!(stats[1].1.missing, 3);
    }
}
