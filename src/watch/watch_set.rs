// src/watch/watch_set.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::errors::{HotloadError, Result};
use crate::watch::path_utils::normalize;

/// Deduplicated set of absolute paths being polled.
///
/// Built once from any number of (possibly overlapping) watch groups and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    paths: BTreeSet<PathBuf>,
}

impl WatchSet {
    /// Flatten `groups` into a single set.
    ///
    /// Relative paths are resolved against `root`, and every path is
    /// normalized with [`normalize`]. An empty result is rejected.
    pub fn new<G, I, P>(root: &Path, groups: G) -> Result<Self>
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: BTreeSet<PathBuf> = groups
            .into_iter()
            .flatten()
            .map(|p| normalize(root, p.as_ref()))
            .collect();

        if paths.is_empty() {
            return Err(HotloadError::EmptyWatchSet);
        }

        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
