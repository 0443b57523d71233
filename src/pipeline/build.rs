// src/pipeline/build.rs

use std::path::Path;

use tracing::debug;

use crate::config::{ConfigFile, StepConfig, UnitConfig};
use crate::errors::{HotloadError, Result};
use crate::pipeline::step::{Hook, Step};
use crate::pipeline::Pipeline;
use crate::types::{FeatureToggles, UnitHandle};
use crate::watch::path_utils::normalize;

/// Handle for a configured unit, with its backing file normalized against
/// `root` the same way watch paths are.
pub fn unit_handle(unit: &UnitConfig, root: &Path) -> UnitHandle {
    let file = unit.file.as_deref().map(|f| normalize(root, Path::new(f)));
    UnitHandle::new(unit.name.clone(), file)
}

/// Build the pipeline described by `cfg`.
///
/// Without `[[step]]` entries the default pipeline is used:
/// clear (unless `no_clear`), reload changed dependencies (if `recursive`),
/// reload the entry unit. With explicit steps, `no_clear` drops every clear
/// step and the order is kept as written.
pub fn build_pipeline(cfg: &ConfigFile, toggles: FeatureToggles, root: &Path) -> Result<Pipeline> {
    let handle = |name: &str| -> Result<UnitHandle> {
        cfg.unit(name)
            .map(|u| unit_handle(u, root))
            .ok_or_else(|| HotloadError::UnitNotFound(name.to_string()))
    };
    let entry_name = cfg.config_section().entry.as_deref();

    let mut steps = Vec::new();

    if cfg.steps().is_empty() {
        let entry = handle(entry_name.ok_or_else(|| {
            HotloadError::ConfigError("default pipeline needs an entry unit".to_string())
        })?)?;

        if !toggles.no_clear {
            steps.push(Step::ClearScreen);
        }
        if toggles.recursive {
            steps.push(Step::reload_changed_dependencies(entry.clone()));
        }
        steps.push(Step::reload_unit(entry));
    } else {
        for step in cfg.steps() {
            match step {
                StepConfig::Clear => {
                    if toggles.no_clear {
                        debug!("dropping clear step (no_clear)");
                        continue;
                    }
                    steps.push(Step::ClearScreen);
                }
                StepConfig::Command { cmd } => steps.push(Step::command(cmd.clone())),
                StepConfig::Reload { unit, pre, post } => {
                    steps.push(Step::reload_unit_with_hooks(
                        handle(unit)?,
                        pre.clone().map(Hook::Command),
                        post.clone().map(Hook::Command),
                    ));
                }
                StepConfig::ReloadDependencies { entry } => {
                    let name = entry.as_deref().or(entry_name).ok_or_else(|| {
                        HotloadError::ConfigError(
                            "reload_dependencies step needs an entry unit".to_string(),
                        )
                    })?;
                    steps.push(Step::reload_changed_dependencies(handle(name)?));
                }
            }
        }
    }

    debug!(
        steps = ?steps.iter().map(Step::describe).collect::<Vec<_>>(),
        "pipeline built"
    );
    Ok(Pipeline::new(steps))
}
