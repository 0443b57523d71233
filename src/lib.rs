// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod unit;
pub mod watch;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, resolve_toggles_from_env, ConfigFile};
use crate::engine::{OrchestratorOptions, ReloadOrchestrator};
use crate::errors::{HotloadError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{build_pipeline, Pipeline, Step};
use crate::types::FeatureToggles;
use crate::unit::{ProcessUnitRegistry, ProcessUnitSpec};
use crate::watch::{ChangeTracker, WatchPatterns, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and toggle resolution
/// - watch set construction (paths, globs, unit files, stdin)
/// - the process unit registry
/// - pipeline + orchestrator
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;

    if let Some(entry) = args.entry.as_deref() {
        cfg.set_entry(entry).map_err(HotloadError::ConfigError)?;
    }
    if let Some(ms) = args.poll_interval_ms {
        cfg.set_poll_interval_ms(ms).map_err(HotloadError::ConfigError)?;
    }

    let root = config_root_dir(&config_path);
    let toggles = resolve_toggles_from_env(args.recursive, args.no_clear, cfg.config_section());
    debug!(?toggles, root = ?root, "resolved feature toggles");

    let stdin_paths = if args.stdin {
        read_stdin_paths()?
    } else {
        Vec::new()
    };

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let watch_set = build_watch_set(&cfg, fs.as_ref(), &root, stdin_paths)?;
    let pipeline = build_pipeline(&cfg, toggles, &root)?;

    if args.dry_run {
        print_dry_run(&cfg, &watch_set, &pipeline, toggles);
        return Ok(());
    }

    let options = orchestrator_options(&cfg, toggles, args.once)?;

    let specs = cfg
        .units()
        .iter()
        .map(|u| ProcessUnitSpec::from_config(u, &root))
        .collect();
    let mut registry = ProcessUnitRegistry::new(specs);
    if !args.once {
        registry.load_all()?;
    }

    // Ctrl-C → cooperative cancellation.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    let tracker = ChangeTracker::new(fs);
    let mut orchestrator =
        ReloadOrchestrator::new(watch_set, tracker, pipeline, registry, options, cancel);

    let result = orchestrator.run().await;
    orchestrator.registry_mut().shutdown().await;
    let summary = result?;

    info!(
        runs = summary.runs,
        failed_steps = summary.failed_steps,
        cancelled = summary.cancelled,
        "hotload finished"
    );

    if args.once && summary.failed_steps > 0 {
        return Err(HotloadError::RunFailed {
            failed: summary.failed_steps,
        });
    }
    Ok(())
}

/// Figure out the project root that relative paths resolve against.
///
/// - If the config path has a non-empty parent (e.g. "dev/Hotload.toml"),
///   we use that directory, made absolute.
/// - If it's just a bare filename like "Hotload.toml" (parent = ""),
///   we fall back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            watch::path_utils::normalize(&cwd, parent)
        }
        _ => cwd,
    }
}

/// Flatten every watch group from the config (plus `extra`) into a
/// `WatchSet`.
///
/// Groups: `[watch].paths`, the expansion of `[watch].patterns`, every unit's
/// backing file, and `extra` (e.g. paths read from stdin).
pub fn build_watch_set(
    cfg: &ConfigFile,
    fs: &dyn FileSystem,
    root: &Path,
    extra: Vec<PathBuf>,
) -> Result<WatchSet> {
    let section = cfg.watch_section();

    let explicit: Vec<PathBuf> = section.paths.iter().map(PathBuf::from).collect();
    let expanded = WatchPatterns::new(&section.patterns, &section.exclude)?.expand(fs, root)?;
    let unit_files: Vec<PathBuf> = cfg
        .units()
        .iter()
        .filter_map(|u| u.file.as_ref().map(PathBuf::from))
        .collect();

    WatchSet::new(root, [explicit, expanded, unit_files, extra])
}

/// Translate config + toggles into orchestrator options.
///
/// Fails if the poll interval does not fit in a `Duration`.
pub fn orchestrator_options(
    cfg: &ConfigFile,
    toggles: FeatureToggles,
    once: bool,
) -> Result<OrchestratorOptions> {
    let section = cfg.config_section();
    let poll_interval = Duration::try_from_secs_f64(section.poll_interval_ms / 1000.0)
        .map_err(|e| {
            HotloadError::ConfigError(format!(
                "poll_interval_ms = {} is out of range: {e}",
                section.poll_interval_ms
            ))
        })?;
    Ok(OrchestratorOptions {
        poll_interval,
        run_once_first: section.run_once_first || once,
        recursive: toggles.recursive,
        settle: Duration::from_millis(section.settle_ms),
        exit_after_first_run: once,
    })
}

/// Read newline-separated paths from stdin, skipping blank lines.
fn read_stdin_paths() -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }
    debug!(count = paths.len(), "read watch paths from stdin");
    Ok(paths)
}

/// Dry-run output: print watch set, units and pipeline.
fn print_dry_run(cfg: &ConfigFile, watch_set: &WatchSet, pipeline: &Pipeline, toggles: FeatureToggles) {
    let section = cfg.config_section();
    println!("hotload dry-run");
    println!("  config.poll_interval_ms = {}", section.poll_interval_ms);
    println!("  config.run_once_first = {}", section.run_once_first);
    println!("  config.settle_ms = {}", section.settle_ms);
    println!("  toggles.recursive = {}", toggles.recursive);
    println!("  toggles.no_clear = {}", toggles.no_clear);
    if let Some(entry) = &section.entry {
        println!("  entry = {entry}");
    }
    println!();

    println!("watch ({}):", watch_set.len());
    for path in watch_set.iter() {
        println!("  - {}", path.display());
    }
    println!();

    println!("units ({}):", cfg.units().len());
    for unit in cfg.units() {
        println!("  - {}", unit.name);
        println!("      cmd: {}", unit.cmd);
        if let Some(ref file) = unit.file {
            println!("      file: {file}");
        }
    }
    println!();

    println!("pipeline ({}):", pipeline.len());
    for (i, step) in pipeline.steps().iter().enumerate() {
        println!("  {}. {}", i + 1, step.describe());
        if let Step::ReloadUnit {
            pre_hook, post_hook, ..
        } = step
        {
            if let Some(hook) = pre_hook {
                println!("      pre: {hook:?}");
            }
            if let Some(hook) = post_hook {
                println!("      post: {hook:?}");
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
