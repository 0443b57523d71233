use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use hotload::errors::{HotloadError, Result};
use hotload::types::UnitHandle;
use hotload::unit::UnitRegistry;

/// A `UnitRegistry` that records reloads instead of restarting anything.
///
/// The reload log is shared, so a test can keep a [`ReloadLog`] handle after
/// moving the registry into an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FakeRegistry {
    units: Vec<UnitHandle>,
    failing: HashSet<String>,
    log: ReloadLog,
}

/// Shared, ordered record of reloaded unit names.
#[derive(Debug, Clone, Default)]
pub struct ReloadLog(Arc<Mutex<Vec<String>>>);

impl ReloadLog {
    pub fn reloaded(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, name: &str) {
        self.0.lock().unwrap().push(name.to_string());
    }
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded unit backed by `file`.
    pub fn with_unit(mut self, name: &str, file: impl Into<PathBuf>) -> Self {
        self.units.push(UnitHandle::new(name, Some(file.into())));
        self
    }

    /// Register a loaded unit with no backing file.
    pub fn with_fileless_unit(mut self, name: &str) -> Self {
        self.units.push(UnitHandle::new(name, None));
        self
    }

    /// Make every reload of `name` fail.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn handle(&self, name: &str) -> UnitHandle {
        self.units
            .iter()
            .find(|u| u.name() == name)
            .cloned()
            .unwrap_or_else(|| panic!("unknown fake unit {name}"))
    }

    pub fn log(&self) -> ReloadLog {
        self.log.clone()
    }
}

impl UnitRegistry for FakeRegistry {
    fn list_loaded_units(&self) -> Vec<UnitHandle> {
        self.units.clone()
    }

    fn reload_unit<'a>(
        &'a mut self,
        unit: &'a UnitHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.log.push(unit.name());
            if self.failing.contains(unit.name()) {
                return Err(HotloadError::Other(anyhow!(
                    "fake reload of {} failed",
                    unit.name()
                )));
            }
            Ok(())
        })
    }
}
