// src/watch/snapshot.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Modification times of every watched path at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSnapshot {
    entries: BTreeMap<PathBuf, SystemTime>,
}

impl ChangeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, modified: SystemTime) {
        self.entries.insert(path, modified);
    }

    pub fn get(&self, path: &Path) -> Option<SystemTime> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PathBuf, SystemTime)> for ChangeSnapshot {
    fn from_iter<T: IntoIterator<Item = (PathBuf, SystemTime)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Paths whose timestamp differs between `old` and `new`, or that appear in
/// only one of them.
pub fn diff(old: &ChangeSnapshot, new: &ChangeSnapshot) -> BTreeSet<PathBuf> {
    let mut changed = BTreeSet::new();

    for (path, modified) in &old.entries {
        if new.entries.get(path) != Some(modified) {
            changed.insert(path.clone());
        }
    }
    for path in new.entries.keys() {
        if !old.entries.contains_key(path) {
            changed.insert(path.clone());
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn diff_reports_modified_and_one_sided_paths() {
        let old: ChangeSnapshot = [
            (PathBuf::from("/a"), at(1)),
            (PathBuf::from("/b"), at(1)),
            (PathBuf::from("/gone"), at(1)),
        ]
        .into_iter()
        .collect();
        let new: ChangeSnapshot = [
            (PathBuf::from("/a"), at(1)),
            (PathBuf::from("/b"), at(2)),
            (PathBuf::from("/new"), at(1)),
        ]
        .into_iter()
        .collect();

        let changed: Vec<_> = diff(&old, &new).into_iter().collect();
        assert_eq!(
            changed,
            vec![
                PathBuf::from("/b"),
                PathBuf::from("/gone"),
                PathBuf::from("/new"),
            ]
        );
    }

    #[test]
    fn older_timestamp_also_counts_as_change() {
        let old: ChangeSnapshot = [(PathBuf::from("/a"), at(5))].into_iter().collect();
        let new: ChangeSnapshot = [(PathBuf::from("/a"), at(3))].into_iter().collect();
        assert_eq!(diff(&old, &new).len(), 1);
    }
}
