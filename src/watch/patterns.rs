// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;

/// Compiled `[watch].patterns` / `[watch].exclude` globs.
///
/// Patterns are relative to the project root. They are only used once, at
/// startup, to expand into concrete files for the `WatchSet`. The poller
/// itself never re-evaluates them, so files created later are not picked up.
#[derive(Clone)]
pub struct WatchPatterns {
    include: GlobSet,
    exclude: Option<GlobSet>,
    empty: bool,
}

impl fmt::Debug for WatchPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPatterns")
            .field("include", &self.include.len())
            .field("empty", &self.empty)
            .finish_non_exhaustive()
    }
}

impl WatchPatterns {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include_set =
            build_globset(include).context("building watch globset")?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            include: include_set,
            exclude: exclude_set,
            empty: include.is_empty(),
        })
    }

    /// Returns true if the path (relative to project root, forward slashes)
    /// should be watched.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Walk `root` and collect every file matching these patterns.
    ///
    /// Symlinked directories are not descended into, so a link back to an
    /// ancestor cannot make the walk loop. Results are sorted so the
    /// expansion is stable across runs.
    pub fn expand(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        if self.empty {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    if fs.is_symlink(&path) {
                        debug!(?path, "not following symlinked directory");
                        continue;
                    }
                    stack.push(path);
                } else if fs.is_file(&path) {
                    if let Some(rel) = relative_str(root, &path) {
                        if self.matches(&rel) {
                            files.push(path);
                        }
                    }
                }
            }
        }

        files.sort();
        debug!(count = files.len(), ?root, "expanded watch patterns");
        Ok(files)
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
