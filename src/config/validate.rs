// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile, StepConfig};
use crate::errors::{HotloadError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HotloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.config, raw.watch, raw.unit, raw.step,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_units(cfg)?;
    validate_steps(cfg)?;
    Ok(())
}

pub(crate) fn check_poll_interval(ms: f64) -> std::result::Result<(), String> {
    if !ms.is_finite() || ms <= 0.0 {
        return Err(format!("poll_interval_ms must be a positive number (got {ms})"));
    }
    if std::time::Duration::try_from_secs_f64(ms / 1000.0).is_err() {
        return Err(format!("poll_interval_ms is too large (got {ms})"));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    check_poll_interval(cfg.config.poll_interval_ms)
        .map_err(|msg| HotloadError::ConfigError(format!("[config].{msg}")))?;

    if let Some(entry) = &cfg.config.entry {
        ensure_unit_exists(cfg, entry, "[config].entry")?;
    }

    Ok(())
}

fn validate_units(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for unit in cfg.unit.iter() {
        if unit.name.trim().is_empty() {
            return Err(HotloadError::ConfigError(
                "[[unit]] entries must have a non-empty name".to_string(),
            ));
        }
        if !seen.insert(unit.name.as_str()) {
            return Err(HotloadError::ConfigError(format!(
                "unit '{}' is defined more than once",
                unit.name
            )));
        }
        if unit.cmd.trim().is_empty() {
            return Err(HotloadError::ConfigError(format!(
                "unit '{}' has an empty cmd",
                unit.name
            )));
        }
    }
    Ok(())
}

fn validate_steps(cfg: &RawConfigFile) -> Result<()> {
    if cfg.step.is_empty() {
        // The default pipeline reloads the entry unit.
        if cfg.config.entry.is_none() {
            return Err(HotloadError::ConfigError(
                "no [[step]] given and no [config].entry to reload".to_string(),
            ));
        }
        return Ok(());
    }

    for (i, step) in cfg.step.iter().enumerate() {
        match step {
            StepConfig::Clear => {}
            StepConfig::Command { cmd } => {
                if cmd.trim().is_empty() {
                    return Err(HotloadError::ConfigError(format!(
                        "step #{i} has an empty cmd"
                    )));
                }
            }
            StepConfig::Reload { unit, .. } => {
                ensure_unit_exists(cfg, unit, &format!("step #{i}"))?;
            }
            StepConfig::ReloadDependencies { entry } => {
                match entry.as_ref().or(cfg.config.entry.as_ref()) {
                    Some(entry) => ensure_unit_exists(cfg, entry, &format!("step #{i}"))?,
                    None => {
                        return Err(HotloadError::ConfigError(format!(
                            "step #{i} (reload_dependencies) needs an entry unit"
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

fn ensure_unit_exists(cfg: &RawConfigFile, name: &str, what: &str) -> Result<()> {
    if cfg.unit.iter().any(|u| u.name == name) {
        Ok(())
    } else {
        Err(HotloadError::ConfigError(format!(
            "{what} refers to unknown unit '{name}'"
        )))
    }
}
