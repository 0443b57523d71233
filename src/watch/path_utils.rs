// src/watch/path_utils.rs

//! Utility functions for path handling in the poller.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `root` and normalize it lexically.
///
/// `.` components are dropped and `..` pops the previous component. The
/// filesystem is never consulted, so symlinks are left alone and paths that
/// do not exist yet normalize fine. Every path that ends up in a `WatchSet`
/// or in a unit's backing file goes through here, which is what makes exact
/// equality a valid way to match them.
pub fn normalize(root: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root.
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_joins_relative_paths() {
        let got = normalize(Path::new("/proj"), Path::new("./src/../app.py"));
        assert_eq!(got, PathBuf::from("/proj/app.py"));
    }

    #[test]
    fn normalize_keeps_absolute_paths() {
        let got = normalize(Path::new("/proj"), Path::new("/etc/./hosts"));
        assert_eq!(got, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn normalize_does_not_escape_root() {
        let got = normalize(Path::new("/"), Path::new("../../a"));
        assert_eq!(got, PathBuf::from("/a"));
    }

    #[test]
    fn relative_str_uses_forward_slashes() {
        let rel = relative_str(Path::new("/proj"), Path::new("/proj/src/a.py"));
        assert_eq!(rel.as_deref(), Some("src/a.py"));
        assert_eq!(relative_str(Path::new("/proj"), Path::new("/other/a.py")), None);
    }
}
