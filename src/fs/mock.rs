// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { modified: SystemTime },
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths that report as symbolic links.
    symlinks: HashSet<PathBuf>,
    /// Remaining number of stat calls that should fail for a path.
    stat_failures: HashMap<PathBuf, usize>,
    stat_calls: usize,
}

/// In-memory filesystem with controllable modification times.
///
/// Clones share the same state, so a test can keep a handle while the
/// orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned mock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add (or replace) a file with the given modification time.
    pub fn add_file_at(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        state.entries.insert(
            path.clone(),
            MockEntry::File { modified },
        );

        if let Some(parent) = path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };

            ensure_dir_entry(&mut state.entries, parent);
            link_child(&mut state.entries, parent, &path);
        }
    }

    /// Add a file stamped with `SystemTime::UNIX_EPOCH`.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.add_file_at(path, SystemTime::UNIX_EPOCH);
    }

    /// Add a directory at `link` that is a symbolic link to `target`.
    ///
    /// The link lists the target's children at the time of the call, so a
    /// link to an ancestor forms a cycle.
    pub fn add_dir_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = link.as_ref().to_path_buf();
        let mut state = self.lock();
        let children = match state.entries.get(target.as_ref()) {
            Some(MockEntry::Dir(children)) => children.clone(),
            _ => Vec::new(),
        };
        state.entries.insert(link.clone(), MockEntry::Dir(children));
        state.symlinks.insert(link.clone());

        if let Some(parent) = link.parent() {
            ensure_dir_entry(&mut state.entries, parent);
            link_child(&mut state.entries, parent, &link);
        }
    }

    /// Set the modification time of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.lock();
        if let Some(MockEntry::File { modified: m, .. }) = state.entries.get_mut(path.as_ref()) {
            *m = modified;
        }
    }

    /// Advance the modification time of a file by `by`.
    pub fn touch(&self, path: impl AsRef<Path>, by: Duration) {
        let mut state = self.lock();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified += by;
        }
    }

    /// Remove a file entry (its parent keeps listing it; `read_dir` callers
    /// filter with `is_file`).
    pub fn remove(&self, path: impl AsRef<Path>) -> Option<MockEntry> {
        self.lock().entries.remove(path.as_ref())
    }

    /// Make the next `times` stat calls on `path` fail with `NotFound`.
    pub fn fail_stat(&self, path: impl AsRef<Path>, times: usize) {
        self.lock()
            .stat_failures
            .insert(path.as_ref().to_path_buf(), times);
    }

    /// Total number of `modified` calls served so far.
    pub fn stat_calls(&self) -> usize {
        self.lock().stat_calls
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };

        if parent != path {
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        let mut state = self.lock();
        state.stat_calls += 1;

        if let Some(remaining) = state.stat_failures.get_mut(path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("injected stat failure: {:?}", path),
                ));
            }
        }

        match state.entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.lock().symlinks.contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_failures_run_out() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt");
        fs.fail_stat("/w/a.txt", 2);

        assert!(fs.modified(Path::new("/w/a.txt")).is_err());
        assert!(fs.modified(Path::new("/w/a.txt")).is_err());
        assert_eq!(
            fs.modified(Path::new("/w/a.txt")).unwrap(),
            SystemTime::UNIX_EPOCH
        );
        assert_eq!(fs.stat_calls(), 3);
    }

    #[test]
    fn touch_advances_mtime() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt");
        fs.touch("/w/a.txt", Duration::from_secs(5));

        assert_eq!(
            fs.modified(Path::new("/w/a.txt")).unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(5)
        );
        assert!(fs.is_dir(Path::new("/w")));
        assert_eq!(fs.read_dir(Path::new("/w")).unwrap(), vec![PathBuf::from("/w/a.txt")]);
    }

    #[test]
    fn dir_symlink_mirrors_target() {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt");
        fs.add_dir_symlink("/w/loop", "/w");

        assert!(fs.is_dir(Path::new("/w/loop")));
        assert!(fs.is_symlink(Path::new("/w/loop")));
        assert!(!fs.is_symlink(Path::new("/w")));
        assert_eq!(
            fs.read_dir(Path::new("/w/loop")).unwrap(),
            vec![PathBuf::from("/w/loop/a.txt")]
        );
    }
}
