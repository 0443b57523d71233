// tests/selective_reload.rs

mod common;
use crate::common::{fast_options, init_tracing, mock_fs, orchestrator, p};

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use hotload::engine::{OrchestratorOptions, TickOutcome};
use hotload::pipeline::Step;
use hotload::unit::{resolve_changed_units, UnitRegistry};
use hotload_test_utils::fake_registry::FakeRegistry;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn registry() -> FakeRegistry {
    FakeRegistry::new()
        .with_unit("A", p("a.py"))
        .with_unit("B", p("b.py"))
        .with_unit("Entry", p("main.py"))
}

fn changed(paths: &[&str]) -> BTreeSet<PathBuf> {
    paths.iter().map(|f| p(f)).collect()
}

#[test]
fn resolution_keeps_registry_order_and_drops_unknown_paths() {
    let reg = registry();
    let units = resolve_changed_units(&reg, &changed(&["main.py", "style.css", "b.py"]));

    let names: Vec<&str> = units.iter().map(|u| u.name()).collect();
    assert_eq!(names, vec!["B", "Entry"]);
}

#[test]
fn fileless_units_never_match() {
    let reg = FakeRegistry::new().with_fileless_unit("builtin");
    assert!(resolve_changed_units(&reg, &changed(&["a.py"])).is_empty());
}

#[test]
fn resolve_by_path_uses_exact_match() {
    let reg = registry();
    assert_eq!(
        reg.resolve_unit_by_path(&p("b.py")).map(|u| u.name().to_string()),
        Some("B".to_string())
    );
    assert!(reg.resolve_unit_by_path(&p("sub/../b.py")).is_none());
}

#[tokio::test]
async fn only_changed_dependencies_and_the_entry_are_reloaded() -> TestResult {
    init_tracing();

    let fs = mock_fs(&["a.py", "b.py", "main.py"]);
    let reg = registry();
    let entry = reg.handle("Entry");
    let log = reg.log();

    let mut orch = orchestrator(
        &fs,
        &["a.py", "b.py", "main.py"],
        vec![
            Step::reload_changed_dependencies(entry.clone()),
            Step::reload_unit(entry),
        ],
        reg,
        fast_options(),
    );

    orch.start().await?;
    fs.touch(p("b.py"), Duration::from_secs(1));
    fs.touch(p("main.py"), Duration::from_secs(1));

    match orch.tick().await? {
        TickOutcome::Ran { context, .. } => {
            let names: Vec<&str> = context.units().iter().map(|u| u.name()).collect();
            assert_eq!(names, vec!["B", "Entry"]);
        }
        other => panic!("expected a run, got {other:?}"),
    }

    // B once as a dependency, Entry once as the entry step. Never A.
    assert_eq!(log.reloaded(), vec!["B", "Entry"]);
    Ok(())
}

#[tokio::test]
async fn context_is_empty_when_resolution_is_off() -> TestResult {
    let fs = mock_fs(&["a.py"]);
    let reg = registry();
    let entry = reg.handle("Entry");

    let mut orch = orchestrator(
        &fs,
        &["a.py"],
        vec![Step::reload_unit(entry)],
        reg,
        fast_options(),
    );

    orch.start().await?;
    fs.touch(p("a.py"), Duration::from_secs(1));

    match orch.tick().await? {
        TickOutcome::Ran { context, .. } => assert!(context.is_empty()),
        other => panic!("expected a run, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn recursive_option_fills_the_context() -> TestResult {
    let fs = mock_fs(&["a.py"]);
    let reg = registry();
    let entry = reg.handle("Entry");

    let mut orch = orchestrator(
        &fs,
        &["a.py"],
        vec![Step::reload_unit(entry)],
        reg,
        OrchestratorOptions {
            recursive: true,
            ..fast_options()
        },
    );

    orch.start().await?;
    fs.touch(p("a.py"), Duration::from_secs(1));

    match orch.tick().await? {
        TickOutcome::Ran { context, .. } => {
            assert_eq!(context.units().len(), 1);
            assert_eq!(context.units()[0].name(), "A");
        }
        other => panic!("expected a run, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn broken_dependency_does_not_block_the_entry() -> TestResult {
    init_tracing();

    let fs = mock_fs(&["a.py", "b.py", "main.py"]);
    let reg = registry().failing("A");
    let entry = reg.handle("Entry");
    let log = reg.log();

    let mut orch = orchestrator(
        &fs,
        &["a.py", "b.py", "main.py"],
        vec![
            Step::reload_changed_dependencies(entry.clone()),
            Step::reload_unit(entry),
        ],
        reg,
        fast_options(),
    );

    orch.start().await?;
    fs.touch(p("a.py"), Duration::from_secs(1));
    fs.touch(p("b.py"), Duration::from_secs(1));

    match orch.tick().await? {
        TickOutcome::Ran { failed_steps, .. } => assert_eq!(failed_steps, 0),
        other => panic!("expected a run, got {other:?}"),
    }
    assert_eq!(log.reloaded(), vec!["A", "B", "Entry"]);
    Ok(())
}

#[tokio::test]
async fn failed_entry_reload_counts_as_a_failed_step() -> TestResult {
    let fs = mock_fs(&["main.py"]);
    let reg = registry().failing("Entry");
    let entry = reg.handle("Entry");

    let mut orch = orchestrator(
        &fs,
        &["main.py"],
        vec![Step::reload_unit(entry)],
        reg,
        fast_options(),
    );

    orch.start().await?;
    fs.touch(p("main.py"), Duration::from_secs(1));

    match orch.tick().await? {
        TickOutcome::Ran { failed_steps, .. } => assert_eq!(failed_steps, 1),
        other => panic!("expected a run, got {other:?}"),
    }
    Ok(())
}
