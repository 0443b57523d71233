// src/pipeline/step.rs

use std::fmt;
use std::io::Write as _;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::errors::StepError;
use crate::exec::run_checked;
use crate::pipeline::context::{ReloadContext, StepEnv};
use crate::pipeline::terminal::clear_screen;
use crate::types::UnitHandle;
use crate::unit::UnitRegistry;

/// Caller-supplied logic run by [`Step::Callback`] or a callback hook.
pub type Callback = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Extra work run right before or after a unit reload.
pub enum Hook {
    Command(String),
    Callback(Callback),
}

impl Hook {
    async fn invoke(&mut self) -> Result<(), StepError> {
        match self {
            Hook::Command(cmd) => run_checked(cmd).await,
            Hook::Callback(callback) => callback().map_err(StepError::Callback),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Hook::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// One unit of pipeline work.
pub enum Step {
    /// Run caller-supplied logic.
    Callback { label: String, callback: Callback },
    /// Run a shell command to completion.
    Command(String),
    /// Clear the terminal.
    ClearScreen,
    /// Reload a single unit, wrapped in optional hooks.
    ReloadUnit {
        unit: UnitHandle,
        pre_hook: Option<Hook>,
        post_hook: Option<Hook>,
    },
    /// Reload every unit in the context except `entry`.
    ReloadChangedDependencies { entry: UnitHandle },
}

impl Step {
    pub fn callback<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Step::Callback {
            label: label.into(),
            callback: Box::new(callback),
        }
    }

    pub fn command(cmd: impl Into<String>) -> Self {
        Step::Command(cmd.into())
    }

    pub fn reload_unit(unit: UnitHandle) -> Self {
        Step::ReloadUnit {
            unit,
            pre_hook: None,
            post_hook: None,
        }
    }

    pub fn reload_unit_with_hooks(
        unit: UnitHandle,
        pre_hook: Option<Hook>,
        post_hook: Option<Hook>,
    ) -> Self {
        Step::ReloadUnit {
            unit,
            pre_hook,
            post_hook,
        }
    }

    pub fn reload_changed_dependencies(entry: UnitHandle) -> Self {
        Step::ReloadChangedDependencies { entry }
    }

    /// Human-readable identity used in logs and failure reports.
    pub fn describe(&self) -> String {
        match self {
            Step::Callback { label, .. } => format!("callback `{label}`"),
            Step::Command(cmd) => format!("command `{cmd}`"),
            Step::ClearScreen => "clear screen".to_string(),
            Step::ReloadUnit { unit, .. } => format!("reload unit `{unit}`"),
            Step::ReloadChangedDependencies { entry } => {
                format!("reload changed dependencies of `{entry}`")
            }
        }
    }

    /// Execute the step once.
    pub async fn run<R>(
        &mut self,
        ctx: &ReloadContext,
        env: &mut StepEnv<'_, R>,
    ) -> Result<(), StepError>
    where
        R: UnitRegistry + ?Sized,
    {
        match self {
            Step::Callback { callback, .. } => callback().map_err(StepError::Callback),
            Step::Command(cmd) => run_checked(cmd).await,
            Step::ClearScreen => clear_screen(env.console).map_err(StepError::from),
            Step::ReloadUnit {
                unit,
                pre_hook,
                post_hook,
            } => reload_with_hooks(unit, pre_hook.as_mut(), post_hook.as_mut(), env).await,
            Step::ReloadChangedDependencies { entry } => {
                reload_dependencies(entry, ctx, env).await;
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Callback { label, .. } => f
                .debug_struct("Callback")
                .field("label", label)
                .finish_non_exhaustive(),
            Step::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Step::ClearScreen => f.write_str("ClearScreen"),
            Step::ReloadUnit {
                unit,
                pre_hook,
                post_hook,
            } => f
                .debug_struct("ReloadUnit")
                .field("unit", unit)
                .field("pre_hook", pre_hook)
                .field("post_hook", post_hook)
                .finish(),
            Step::ReloadChangedDependencies { entry } => f
                .debug_struct("ReloadChangedDependencies")
                .field("entry", entry)
                .finish(),
        }
    }
}

async fn reload_with_hooks<R>(
    unit: &UnitHandle,
    pre_hook: Option<&mut Hook>,
    post_hook: Option<&mut Hook>,
    env: &mut StepEnv<'_, R>,
) -> Result<(), StepError>
where
    R: UnitRegistry + ?Sized,
{
    if let Some(hook) = pre_hook {
        hook.invoke().await.map_err(|e| StepError::Hook {
            stage: "pre",
            unit: unit.name().to_string(),
            cause: Box::new(e),
        })?;
    }

    env.registry
        .reload_unit(unit)
        .await
        .map_err(|source| StepError::Reload {
            unit: unit.name().to_string(),
            source,
        })?;

    if let Some(hook) = post_hook {
        hook.invoke().await.map_err(|e| StepError::Hook {
            stage: "post",
            unit: unit.name().to_string(),
            cause: Box::new(e),
        })?;
    }

    let now = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
    writeln!(env.console, "Successfully reloaded {unit} @ {now}")?;
    info!(unit = %unit, "unit reloaded");
    Ok(())
}

/// Reload changed dependencies, skipping the entry unit.
///
/// A broken dependency is logged and does not stop the others.
async fn reload_dependencies<R>(entry: &UnitHandle, ctx: &ReloadContext, env: &mut StepEnv<'_, R>)
where
    R: UnitRegistry + ?Sized,
{
    for unit in ctx.units() {
        if unit.same_unit(entry) {
            debug!(unit = %unit, "skipping entry unit in dependency reload");
            continue;
        }
        match env.registry.reload_unit(unit).await {
            Ok(()) => info!(unit = %unit, "dependency unit reloaded"),
            Err(e) => warn!(unit = %unit, error = %e, "dependency unit failed to reload"),
        }
    }
}
