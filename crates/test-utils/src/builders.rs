use hotload::config::{ConfigFile, RawConfigFile, UnitConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_unit(mut self, unit: UnitConfig) -> Self {
        self.config.unit.push(unit);
        self
    }

    pub fn entry(mut self, name: &str) -> Self {
        self.config.config.entry = Some(name.to_string());
        self
    }

    pub fn poll_interval_ms(mut self, ms: f64) -> Self {
        self.config.config.poll_interval_ms = ms;
        self
    }

    pub fn settle_ms(mut self, ms: u64) -> Self {
        self.config.config.settle_ms = ms;
        self
    }

    pub fn watch_path(mut self, path: &str) -> Self {
        self.config.watch.paths.push(path.to_string());
        self
    }

    pub fn watch_pattern(mut self, pattern: &str) -> Self {
        self.config.watch.patterns.push(pattern.to_string());
        self
    }

    pub fn watch_exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `UnitConfig`.
pub struct UnitConfigBuilder {
    unit: UnitConfig,
}

impl UnitConfigBuilder {
    pub fn new(name: &str, cmd: &str) -> Self {
        Self {
            unit: UnitConfig {
                name: name.to_string(),
                cmd: cmd.to_string(),
                file: None,
            },
        }
    }

    pub fn file(mut self, path: &str) -> Self {
        self.unit.file = Some(path.to_string());
        self
    }

    pub fn build(self) -> UnitConfig {
        self.unit
    }
}
