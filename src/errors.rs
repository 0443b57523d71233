// src/errors.rs

//! Crate-wide error types and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotloadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("Watch set is empty: nothing to poll")]
    EmptyWatchSet,

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("{failed} step(s) failed during the single run")]
    RunFailed { failed: usize },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A watched path could not be stat'd, even after retrying.
#[derive(Error, Debug)]
#[error("failed to stat watched path {path:?}: {source}")]
pub struct PollError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Failure of a single pipeline step.
///
/// Step errors never abort a pipeline run; the runner records them and moves
/// on to the next step.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("command `{cmd}` exited with code {code:?}")]
    CommandFailed { cmd: String, code: Option<i32> },

    #[error("failed to spawn command `{cmd}`: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("callback failed: {0:#}")]
    Callback(anyhow::Error),

    #[error("{stage}-reload hook for unit `{unit}` failed: {cause}")]
    Hook {
        stage: &'static str,
        unit: String,
        cause: Box<StepError>,
    },

    #[error("reloading unit `{unit}` failed: {source}")]
    Reload {
        unit: String,
        #[source]
        source: HotloadError,
    },

    #[error("terminal IO failed: {0}")]
    Console(#[from] std::io::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotloadError>;
