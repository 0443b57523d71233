// src/config/toggles.rs

//! Resolution of the boolean feature toggles.
//!
//! Priority for each toggle:
//! 1. CLI flag (`--recursive`, `--no-clear`) if set
//! 2. environment variable (`HOTLOAD_RECURSIVE`, `HOTLOAD_NO_CLEAR`)
//! 3. the config file (`[config].recursive`, `[config].clear`)

use crate::config::model::ConfigSection;
use crate::types::FeatureToggles;

pub const RECURSIVE_ENV: &str = "HOTLOAD_RECURSIVE";
pub const NO_CLEAR_ENV: &str = "HOTLOAD_NO_CLEAR";

/// Resolve toggles once, using `env` to look up environment variables.
pub fn resolve_toggles<F>(
    cli_recursive: bool,
    cli_no_clear: bool,
    section: &ConfigSection,
    env: F,
) -> FeatureToggles
where
    F: Fn(&str) -> Option<String>,
{
    let recursive = cli_recursive
        || env(RECURSIVE_ENV).is_some_and(|v| env_flag_enabled(RECURSIVE_ENV, &v))
        || section.recursive;

    let no_clear = cli_no_clear
        || env(NO_CLEAR_ENV).is_some_and(|v| env_flag_enabled(NO_CLEAR_ENV, &v))
        || !section.clear;

    FeatureToggles {
        recursive,
        no_clear,
    }
}

/// Resolve toggles against the real process environment.
pub fn resolve_toggles_from_env(
    cli_recursive: bool,
    cli_no_clear: bool,
    section: &ConfigSection,
) -> FeatureToggles {
    resolve_toggles(cli_recursive, cli_no_clear, section, |k| {
        std::env::var(k).ok()
    })
}

/// A toggle variable counts as set when it holds a truthy value, or its own
/// name (`HOTLOAD_RECURSIVE=HOTLOAD_RECURSIVE`).
fn env_flag_enabled(name: &str, value: &str) -> bool {
    let v = value.trim();
    v == name
        || matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_come_from_config() {
        let section = ConfigSection::default();
        let t = resolve_toggles(false, false, &section, no_env);
        assert_eq!(t, FeatureToggles::default());

        let section = ConfigSection {
            recursive: true,
            clear: false,
            ..ConfigSection::default()
        };
        let t = resolve_toggles(false, false, &section, no_env);
        assert!(t.recursive && t.no_clear);
    }

    #[test]
    fn env_accepts_own_name_and_truthy_values() {
        let section = ConfigSection::default();
        let t = resolve_toggles(false, false, &section, |k| match k {
            RECURSIVE_ENV => Some(RECURSIVE_ENV.to_string()),
            NO_CLEAR_ENV => Some("1".to_string()),
            _ => None,
        });
        assert!(t.recursive);
        assert!(t.no_clear);
    }

    #[test]
    fn falsy_env_value_does_not_enable() {
        let section = ConfigSection::default();
        let t = resolve_toggles(false, false, &section, |k| {
            (k == RECURSIVE_ENV).then(|| "0".to_string())
        });
        assert!(!t.recursive);
    }

    #[test]
    fn cli_flags_win() {
        let section = ConfigSection::default();
        let t = resolve_toggles(true, true, &section, no_env);
        assert!(t.recursive && t.no_clear);
    }
}
