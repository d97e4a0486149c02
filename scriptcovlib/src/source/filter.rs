//! Coverage dump discovery with glob and ignore-list filtering.
//!
//! Dumps are `*.cov.json` files written by the instrumenting runtime. A path
//! is ignored when it, or any directory above it, appears in the ignore list.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::ScriptcovError;
use crate::Result;

/// File name suffix of coverage dumps.
pub const DUMP_SUFFIX: &str = ".cov.json";

/// Configuration for file filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include all dumps)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
    /// Files or directories to skip entirely, stored as absolute paths
    pub ignore: Vec<PathBuf>,
}

impl FilterConfig {
    /// Create a new empty filter config (includes every dump).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern)?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Ignore a file, or every file below a directory.
    pub fn ignore(mut self, path: impl AsRef<Path>) -> Self {
        self.ignore.push(absolute(path.as_ref()));
        self
    }

    /// Whether the path or one of its ancestors is in the ignore list.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path = absolute(path);
        self.ignore.iter().any(|ignored| path.starts_with(ignored))
    }

    /// Check if a path matches the filter criteria.
    ///
    /// A path matches if:
    /// 1. Its name ends in `.cov.json`
    /// 2. It is not ignored
    /// 3. It matches at least one include pattern (or include is empty)
    /// 4. It doesn't match any exclude pattern
    pub fn matches(&self, path: &Path) -> bool {
        let is_dump = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(DUMP_SUFFIX));
        if !is_dump || self.is_ignored(path) {
            return false;
        }

        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| ScriptcovError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || name == "node_modules"
}

/// Discover coverage dumps under a path.
///
/// A file path is returned as-is when it passes the filter. Directories are
/// walked recursively, skipping hidden directories and `node_modules`.
pub fn discover_dumps(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(ScriptcovError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();

    if root.is_file() {
        if filter.matches(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let walker = WalkDir::new(root).follow_links(true).into_iter();

    for entry in walker.filter_entry(|e| {
        if e.depth() == 0 {
            return true;
        }
        if e.file_type().is_dir() {
            let name = e.file_name().to_str().unwrap_or("");
            return !should_skip_dir(name) && !filter.is_ignored(e.path());
        }
        true
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::trace!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && filter.matches(path) {
            tracing::trace!(path = %path.display(), "found coverage dump");
            files.push(path.to_path_buf());
        }
    }

    files.sort();

    Ok(files)
}

/// Discover dumps under several roots, deduplicated and sorted.
pub fn discover_dumps_in(roots: &[PathBuf], filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    let mut all_files = Vec::new();

    for root in roots {
        all_files.extend(discover_dumps(root, filter)?);
    }

    all_files.sort();
    all_files.dedup();

    Ok(all_files)
}
