// src/unit/mod.rs

//! Loaded units and the platform capability that reloads them.
//!
//! The orchestrator never looks inside a unit. It only needs three
//! operations, captured by [`UnitRegistry`]:
//! - list what is currently loaded,
//! - find the unit backed by a given file,
//! - reload a unit in place.
//!
//! [`process::ProcessUnitRegistry`] is the implementation shipped with the
//! binary: every unit is a long-lived child process that gets restarted.
//! Tests substitute a fake that records reloads.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::UnitHandle;

pub mod process;
pub mod resolve;

pub use process::{ProcessUnitRegistry, ProcessUnitSpec};
pub use resolve::resolve_changed_units;

/// Platform capability for reloading code units in place.
pub trait UnitRegistry: Send {
    /// All currently loaded units, in load order.
    fn list_loaded_units(&self) -> Vec<UnitHandle>;

    /// The loaded unit whose backing file is exactly `path`, if any.
    fn resolve_unit_by_path(&self, path: &Path) -> Option<UnitHandle> {
        self.list_loaded_units()
            .into_iter()
            .find(|unit| unit.file() == Some(path))
    }

    /// Reload `unit` in place.
    ///
    /// On failure the unit should stay in its last-good state where the
    /// backend can keep it there. Process units cannot: the old process is
    /// stopped before the new one is spawned, so a failed spawn leaves the
    /// unit stopped. The caller does not retry.
    fn reload_unit<'a>(
        &'a mut self,
        unit: &'a UnitHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
