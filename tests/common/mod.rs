#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use hotload::engine::{CancellationToken, OrchestratorOptions, ReloadOrchestrator};
use hotload::fs::mock::MockFileSystem;
use hotload::pipeline::{Pipeline, Step};
use hotload::watch::{ChangeTracker, WatchSet};
use hotload_test_utils::fake_registry::FakeRegistry;

pub use hotload_test_utils::{init_tracing, with_timeout};

pub const ROOT: &str = "/proj";

/// Absolute path under the fake project root.
pub fn p(rel: &str) -> PathBuf {
    Path::new(ROOT).join(rel)
}

/// A fixed, non-epoch starting mtime.
pub fn t0() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// Mock filesystem with each of `files` created at `t0()`.
pub fn mock_fs(files: &[&str]) -> MockFileSystem {
    let fs = MockFileSystem::new();
    for f in files {
        fs.add_file_at(p(f), t0());
    }
    fs
}

/// Shared call log written by [`recording_step`].
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.all().iter().filter(|c| *c == label).count()
    }

    pub fn push(&self, label: &str) {
        self.0.lock().unwrap().push(label.to_string());
    }
}

/// A callback step that appends `label` to `calls`.
pub fn recording_step(calls: &Calls, label: &str) -> Step {
    let calls = calls.clone();
    let name = label.to_string();
    Step::callback(label, move || {
        calls.push(&name);
        Ok(())
    })
}

/// A callback step that appends `label` to `calls`, then fails.
pub fn failing_step(calls: &Calls, label: &str) -> Step {
    let calls = calls.clone();
    let name = label.to_string();
    Step::callback(label, move || {
        calls.push(&name);
        anyhow::bail!("{name} failed on purpose")
    })
}

/// Options with a fast poll interval and no settling.
pub fn fast_options() -> OrchestratorOptions {
    OrchestratorOptions {
        poll_interval: Duration::from_millis(5),
        ..OrchestratorOptions::default()
    }
}

/// Build an orchestrator over the mock filesystem with console output
/// discarded.
pub fn orchestrator(
    fs: &MockFileSystem,
    watched: &[&str],
    steps: Vec<Step>,
    registry: FakeRegistry,
    options: OrchestratorOptions,
) -> ReloadOrchestrator<FakeRegistry> {
    orchestrator_with_cancel(fs, watched, steps, registry, options, CancellationToken::new())
}

/// Same as [`orchestrator`], but driven by a caller-held token.
pub fn orchestrator_with_cancel(
    fs: &MockFileSystem,
    watched: &[&str],
    steps: Vec<Step>,
    registry: FakeRegistry,
    options: OrchestratorOptions,
    cancel: CancellationToken,
) -> ReloadOrchestrator<FakeRegistry> {
    let watch_set = WatchSet::new(Path::new(ROOT), [watched.iter().map(|f| p(f))])
        .expect("watch set");
    let tracker = ChangeTracker::new(Arc::new(fs.clone()));
    ReloadOrchestrator::new(
        watch_set,
        tracker,
        Pipeline::new(steps),
        registry,
        options,
        cancel,
    )
    .with_console(Box::new(std::io::sink()))
}
