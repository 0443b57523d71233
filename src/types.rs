// src/types.rs

use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque handle to a loaded unit.
///
/// A unit is identified by its name. The backing file, when present, is the
/// normalized path that links it to the watch set; built-in units have none
/// and are never selected by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitHandle {
    name: String,
    file: Option<PathBuf>,
}

impl UnitHandle {
    pub fn new(name: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Two handles refer to the same unit when their names match.
    pub fn same_unit(&self, other: &UnitHandle) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolved boolean feature switches.
///
/// Resolved once at startup (CLI flag, environment, config file) and then
/// threaded through construction; nothing reads the environment mid-loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureToggles {
    /// Reload changed dependency units before the entry unit.
    pub recursive: bool,
    /// Leave the terminal alone between runs.
    pub no_clear: bool,
}
