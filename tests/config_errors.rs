// tests/config_errors.rs

use std::io::Write;
use tempfile::NamedTempFile;
use hotload::config::{load_and_validate, StepConfig};
use hotload::errors::HotloadError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_unknown_entry_returns_config_error() {
    let file = config_file(
        r#"
[config]
entry = "Ghost"

[[unit]]
name = "app"
cmd = "python app.py"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => {
            assert!(msg.contains("unknown unit"));
            assert!(msg.contains("Ghost"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_duplicate_unit_names_are_rejected() {
    let file = config_file(
        r#"
[config]
entry = "app"

[[unit]]
name = "app"
cmd = "python app.py"

[[unit]]
name = "app"
cmd = "python other.py"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => assert!(msg.contains("more than once")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_entry_without_steps_is_rejected() {
    let file = config_file(
        r#"
[[unit]]
name = "app"
cmd = "python app.py"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => assert!(msg.contains("[config].entry")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_non_positive_poll_interval_is_rejected() {
    let file = config_file(
        r#"
[config]
poll_interval_ms = 0
entry = "app"

[[unit]]
name = "app"
cmd = "python app.py"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => assert!(msg.contains("poll_interval_ms")),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unrepresentable_poll_interval_is_rejected() {
    let file = config_file(
        r#"
[config]
poll_interval_ms = 1e300
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => assert!(msg.contains("too large"), "got: {msg}"),
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_step_referencing_unknown_unit_is_rejected() {
    let file = config_file(
        r#"
[[unit]]
name = "app"
cmd = "python app.py"

[[step]]
run = "reload"
unit = "worker"
"#,
    );

    match load_and_validate(file.path()) {
        Err(HotloadError::ConfigError(msg)) => {
            assert!(msg.contains("step #0"));
            assert!(msg.contains("worker"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_toml_returns_toml_error() {
    let file = config_file("[config\nentry = ");

    match load_and_validate(file.path()) {
        Err(HotloadError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_step_kind_returns_toml_error() {
    let file = config_file(
        r#"
[config]
entry = "app"

[[unit]]
name = "app"
cmd = "python app.py"

[[step]]
run = "teleport"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(HotloadError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Hotload.toml"));
    assert!(matches!(result, Err(HotloadError::IoError(_))));
}

#[test]
fn test_full_config_parses() {
    let file = config_file(
        r#"
[config]
poll_interval_ms = 50.0
run_once_first = true
recursive = true
clear = false
settle_ms = 25
entry = "app"

[watch]
paths = ["app.py"]
patterns = ["lib/**/*.py"]
exclude = ["lib/vendor/**"]

[[unit]]
name = "app"
cmd = "python app.py"
file = "app.py"

[[unit]]
name = "lib"
cmd = "python -m lib"
file = "lib/core.py"

[[step]]
run = "clear"

[[step]]
run = "command"
cmd = "make assets"

[[step]]
run = "reload_dependencies"

[[step]]
run = "reload"
unit = "app"
pre = "ruff check app.py"
"#,
    );

    let cfg = load_and_validate(file.path()).expect("valid config");
    let section = cfg.config_section();
    assert_eq!(section.poll_interval_ms, 50.0);
    assert!(section.run_once_first && section.recursive && !section.clear);
    assert_eq!(section.settle_ms, 25);
    assert_eq!(cfg.units().len(), 2);
    assert_eq!(cfg.watch_section().exclude, vec!["lib/vendor/**".to_string()]);
    assert_eq!(
        cfg.steps()[3],
        StepConfig::Reload {
            unit: "app".to_string(),
            pre: Some("ruff check app.py".to_string()),
            post: None,
        }
    );
}

#[test]
fn test_overrides_are_validated() {
    let file = config_file(
        r#"
[config]
entry = "app"

[[unit]]
name = "app"
cmd = "python app.py"

[[unit]]
name = "worker"
cmd = "python worker.py"
"#,
    );

    let mut cfg = load_and_validate(file.path()).unwrap();
    assert!(cfg.set_entry("worker").is_ok());
    assert_eq!(cfg.config_section().entry.as_deref(), Some("worker"));
    assert!(cfg.set_entry("ghost").is_err());
    assert!(cfg.set_poll_interval_ms(-1.0).is_err());
    assert!(cfg.set_poll_interval_ms(1e300).is_err());
    assert!(cfg.set_poll_interval_ms(2.5).is_ok());
}
