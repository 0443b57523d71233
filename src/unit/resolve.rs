// src/unit/resolve.rs

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::types::UnitHandle;
use crate::unit::UnitRegistry;

/// Map a set of changed paths to the loaded units backed by them.
///
/// Units come back in registry (load) order. Paths with no loaded unit, such
/// as non-code assets, are simply dropped, and units without a backing file
/// never match.
pub fn resolve_changed_units<R>(registry: &R, changed: &BTreeSet<PathBuf>) -> Vec<UnitHandle>
where
    R: UnitRegistry + ?Sized,
{
    let units: Vec<UnitHandle> = registry
        .list_loaded_units()
        .into_iter()
        .filter(|unit| unit.file().is_some_and(|file| changed.contains(file)))
        .collect();

    debug!(
        changed = changed.len(),
        units = ?units.iter().map(UnitHandle::name).collect::<Vec<_>>(),
        "resolved changed paths to loaded units"
    );

    units
}
