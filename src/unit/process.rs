// src/unit/process.rs

//! Units backed by long-lived child processes.
//!
//! "Reload in place" for a process unit means: kill the running instance,
//! wait for it to exit, and spawn the command again. Only the unit that is
//! reloaded restarts; the orchestrator and every other unit keep running.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::Context;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::config::UnitConfig;
use crate::errors::{HotloadError, Result};
use crate::exec::shell_command;
use crate::types::UnitHandle;
use crate::unit::UnitRegistry;
use crate::watch::path_utils::normalize;

/// Static description of one process unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessUnitSpec {
    pub name: String,
    pub cmd: String,
    /// Normalized backing file, if the unit has one.
    pub file: Option<PathBuf>,
}

impl ProcessUnitSpec {
    /// Spec for a configured unit; the backing file is normalized against
    /// `root` exactly like watch paths.
    pub fn from_config(unit: &UnitConfig, root: &Path) -> Self {
        Self {
            name: unit.name.clone(),
            cmd: unit.cmd.clone(),
            file: unit.file.as_deref().map(|f| normalize(root, Path::new(f))),
        }
    }
}

struct ProcessUnit {
    handle: UnitHandle,
    cmd: String,
    child: Option<Child>,
    /// Process group of the running child (unix only).
    pgid: Option<u32>,
}

impl ProcessUnit {
    fn spawn(&mut self) -> Result<()> {
        let mut command = shell_command(&self.cmd);
        // Own group, so stopping the unit reaches everything the shell started.
        #[cfg(unix)]
        command.process_group(0);

        let child = command
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning process for unit '{}'", self.handle))?;

        info!(
            unit = %self.handle,
            pid = ?child.id(),
            cmd = %self.cmd,
            "unit process started"
        );
        self.pgid = if cfg!(unix) { child.id() } else { None };
        self.child = Some(child);
        Ok(())
    }

    async fn stop(&mut self) {
        let pgid = self.pgid.take();
        let Some(mut child) = self.child.take() else {
            return;
        };

        let group_killed = pgid.is_some_and(|pgid| kill_group(&self.handle, pgid));
        let stopped = if group_killed {
            child.wait().await.map(|status| {
                debug!(unit = %self.handle, exit_code = ?status.code(), "unit process group stopped");
            })
        } else {
            child.kill().await
        };

        if let Err(e) = stopped {
            warn!(unit = %self.handle, error = %e, "failed to stop unit process");
        }
    }
}

/// SIGKILL every process in group `pgid`. Returns `false` if the group could
/// not be signalled and the caller should fall back to killing the child.
#[cfg(unix)]
fn kill_group(unit: &UnitHandle, pgid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        return false;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => true,
        Err(e) => {
            warn!(unit = %unit, pgid, error = %e, "failed to signal unit process group");
            false
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_unit: &UnitHandle, _pgid: u32) -> bool {
    false
}

/// Registry of process units, kept in configuration order.
///
/// On unix each unit runs in its own process group, and stopping a unit kills
/// the whole group. A reload stops the old instance before spawning the new
/// one, so if the spawn fails the unit is left stopped rather than in its
/// last-good state; the next reload tries again.
pub struct ProcessUnitRegistry {
    units: Vec<ProcessUnit>,
}

impl fmt::Debug for ProcessUnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessUnitRegistry")
            .field(
                "units",
                &self.units.iter().map(|u| u.handle.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProcessUnitRegistry {
    /// Register the units without starting them.
    pub fn new(specs: Vec<ProcessUnitSpec>) -> Self {
        let units = specs
            .into_iter()
            .map(|spec| ProcessUnit {
                handle: UnitHandle::new(spec.name, spec.file),
                cmd: spec.cmd,
                child: None,
                pgid: None,
            })
            .collect();
        Self { units }
    }

    /// Start every unit that is not already running.
    pub fn load_all(&mut self) -> Result<()> {
        for unit in self.units.iter_mut().filter(|u| u.child.is_none()) {
            unit.spawn()?;
        }
        Ok(())
    }

    /// Number of units with a live child process handle.
    pub fn running(&self) -> usize {
        self.units.iter().filter(|u| u.child.is_some()).count()
    }

    /// Stop every unit; used on graceful shutdown.
    pub async fn shutdown(&mut self) {
        for unit in self.units.iter_mut() {
            unit.stop().await;
        }
        info!("all unit processes stopped");
    }
}

impl UnitRegistry for ProcessUnitRegistry {
    fn list_loaded_units(&self) -> Vec<UnitHandle> {
        self.units.iter().map(|u| u.handle.clone()).collect()
    }

    fn reload_unit<'a>(
        &'a mut self,
        unit: &'a UnitHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let target = self
                .units
                .iter_mut()
                .find(|u| u.handle.same_unit(unit))
                .ok_or_else(|| HotloadError::UnitNotFound(unit.name().to_string()))?;

            target.stop().await;
            target.spawn().inspect_err(|_| {
                warn!(unit = %unit, "unit is stopped until its next successful reload");
            })
        })
    }
}
