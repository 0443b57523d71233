// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hotload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotload",
    version,
    about = "Poll files for changes and reload running units in place.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Hotload.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Hotload.toml")]
    pub config: String,

    /// Run the pipeline once and exit; no polling.
    ///
    /// Units are not started up front. A reload step still starts its unit,
    /// and every unit started this way is stopped again before hotload exits,
    /// so `--once` is for checks and builds rather than for launching
    /// long-running processes.
    #[arg(long)]
    pub once: bool,

    /// Also watch the newline-separated paths read from stdin.
    ///
    /// Example: `find . -name '*.py' | hotload --stdin`
    #[arg(long)]
    pub stdin: bool,

    /// Reload changed dependency units before the entry unit
    /// (also `HOTLOAD_RECURSIVE`).
    #[arg(long)]
    pub recursive: bool,

    /// Do not clear the terminal between runs (also `HOTLOAD_NO_CLEAR`).
    #[arg(long)]
    pub no_clear: bool,

    /// Entry unit to reload; overrides `[config].entry`.
    #[arg(long, value_name = "NAME")]
    pub entry: Option<String>,

    /// Poll interval in milliseconds; overrides `[config].poll_interval_ms`.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<f64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTLOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the watch set and pipeline, but don't run
    /// anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let args = CliArgs::try_parse_from([
            "hotload",
            "--config",
            "dev/Hotload.toml",
            "--recursive",
            "--no-clear",
            "--entry",
            "app",
            "--poll-interval-ms",
            "50",
        ])
        .unwrap();

        assert_eq!(args.config, "dev/Hotload.toml");
        assert!(args.recursive && args.no_clear);
        assert_eq!(args.entry.as_deref(), Some("app"));
        assert_eq!(args.poll_interval_ms, Some(50.0));
        assert!(!args.once && !args.stdin && !args.dry_run);
    }

    #[test]
    fn once_help_says_started_units_are_stopped_on_exit() {
        use clap::CommandFactory;

        let cmd = CliArgs::command();
        let once = cmd
            .get_arguments()
            .find(|a| a.get_id() == "once")
            .expect("--once is defined");
        let help = once.get_long_help().expect("--once has long help").to_string();
        assert!(help.contains("stopped again before hotload exits"), "got: {help}");
    }
}
