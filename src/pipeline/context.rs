// src/pipeline/context.rs

use std::io::Write;

use crate::types::UnitHandle;

/// Read-only input handed to every step of one pipeline run.
///
/// Carries the loaded units whose backing files changed this tick. It is
/// empty on the initial run and whenever selective reload is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadContext {
    units: Vec<UnitHandle>,
}

impl ReloadContext {
    pub fn new(units: Vec<UnitHandle>) -> Self {
        Self { units }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Collaborators a step may act on: the unit registry and the console that
/// receives terminal output (clear sequences, reload notices).
pub struct StepEnv<'a, R: ?Sized> {
    pub registry: &'a mut R,
    pub console: &'a mut (dyn Write + Send),
}

impl<'a, R: ?Sized> StepEnv<'a, R> {
    pub fn new(registry: &'a mut R, console: &'a mut (dyn Write + Send)) -> Self {
        Self { registry, console }
    }
}
