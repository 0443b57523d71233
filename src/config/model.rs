// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// poll_interval_ms = 6.944
/// recursive = true
/// entry = "app"
///
/// [watch]
/// paths = ["app.py"]
/// patterns = ["lib/**/*.py"]
///
/// [[unit]]
/// name = "app"
/// cmd = "python app.py"
/// file = "app.py"
///
/// [[step]]
/// run = "command"
/// cmd = "make assets"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the
/// unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// `[watch]` paths and patterns.
    #[serde(default)]
    pub watch: WatchSection,

    /// Units from `[[unit]]`, in load order.
    #[serde(default)]
    pub unit: Vec<UnitConfig>,

    /// Pipeline steps from `[[step]]`, in run order.
    ///
    /// Empty means "use the default pipeline".
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (or `new_unchecked` from
/// within the config module), so holders can rely on unit references being
/// resolvable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    watch: WatchSection,
    units: Vec<UnitConfig>,
    steps: Vec<StepConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        watch: WatchSection,
        units: Vec<UnitConfig>,
        steps: Vec<StepConfig>,
    ) -> Self {
        Self {
            config,
            watch,
            units,
            steps,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn units(&self) -> &[UnitConfig] {
        &self.units
    }

    pub fn steps(&self) -> &[StepConfig] {
        &self.steps
    }

    pub fn unit(&self, name: &str) -> Option<&UnitConfig> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Override the entry unit (e.g. from `--entry`).
    ///
    /// Returns an error message if no such unit exists.
    pub fn set_entry(&mut self, name: &str) -> Result<(), String> {
        if self.unit(name).is_none() {
            return Err(format!("unknown entry unit '{name}'"));
        }
        self.config.entry = Some(name.to_string());
        Ok(())
    }

    /// Override the poll interval (e.g. from `--poll-interval-ms`).
    pub fn set_poll_interval_ms(&mut self, ms: f64) -> Result<(), String> {
        super::validate::check_poll_interval(ms)?;
        self.config.poll_interval_ms = ms;
        Ok(())
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Sleep between polls when nothing changed, in (fractional)
    /// milliseconds. Defaults to one frame at 144 Hz.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: f64,

    /// Run the pipeline once before entering the poll loop.
    #[serde(default)]
    pub run_once_first: bool,

    /// Reload changed dependency units before the entry unit.
    #[serde(default)]
    pub recursive: bool,

    /// Clear the terminal at the start of each run (default pipeline only).
    #[serde(default = "default_clear")]
    pub clear: bool,

    /// Wait for edits to settle for this long before running, in ms.
    /// `0` disables settling.
    #[serde(default)]
    pub settle_ms: u64,

    /// Name of the entry unit reloaded by the default pipeline.
    #[serde(default)]
    pub entry: Option<String>,
}

fn default_poll_interval_ms() -> f64 {
    1000.0 / 144.0
}

fn default_clear() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            run_once_first: false,
            recursive: false,
            clear: default_clear(),
            settle_ms: 0,
            entry: None,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    /// Explicit files to watch, relative to the config directory.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Glob patterns expanded once at startup.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Globs removed from the pattern expansion.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[[unit]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitConfig {
    pub name: String,

    /// Shell command that runs the unit.
    pub cmd: String,

    /// Backing file; changes to it select this unit for reload. It is always
    /// added to the watch set.
    #[serde(default)]
    pub file: Option<String>,
}

/// `[[step]]` entry, tagged by `run`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "run", rename_all = "snake_case")]
pub enum StepConfig {
    /// `run = "clear"`
    Clear,
    /// `run = "command"`, `cmd = "..."`
    Command { cmd: String },
    /// `run = "reload"`, `unit = "..."`, optional `pre` / `post` commands.
    Reload {
        unit: String,
        #[serde(default)]
        pre: Option<String>,
        #[serde(default)]
        post: Option<String>,
    },
    /// `run = "reload_dependencies"`, optional `entry` (defaults to
    /// `[config].entry`).
    ReloadDependencies {
        #[serde(default)]
        entry: Option<String>,
    },
}
