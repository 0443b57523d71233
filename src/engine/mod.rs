// src/engine/mod.rs

//! Orchestration engine for hotload.
//!
//! This module ties together:
//! - the change tracker (poll → snapshot → diff),
//! - selective reload resolution (changed paths → loaded units),
//! - the pipeline runner,
//! - cooperative cancellation (Ctrl-C or a caller-held token).
//!
//! The pure state machine lives in [`core`]; the async poll loop is
//! implemented in [`runtime`].

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::ReloadContext;

/// Default poll interval: one frame at 144 Hz.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 144);

/// Runtime options for the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// Sleep between polls when nothing changed.
    pub poll_interval: Duration,
    /// Run the pipeline once, with an empty context, before polling.
    pub run_once_first: bool,
    /// Resolve changed paths to loaded units and hand them to the steps.
    pub recursive: bool,
    /// Wait until snapshots stop changing for this long before running.
    /// `Duration::ZERO` disables settling.
    pub settle: Duration,
    /// Stop right after the initial run instead of polling (`--once`).
    pub exit_after_first_run: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            run_once_first: false,
            recursive: false,
            settle: Duration::ZERO,
            exit_after_first_run: false,
        }
    }
}

/// Result of one poll iteration of the async loop.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing changed.
    Idle,
    /// The snapshot could not be taken; treated as no change.
    PollFailed,
    /// Something changed and the pipeline ran once.
    Ran {
        changed: BTreeSet<PathBuf>,
        context: ReloadContext,
        failed_steps: usize,
        cancelled: bool,
    },
    /// Cancellation was observed; the loop is over.
    Cancelled,
}

pub mod core;
pub mod runtime;

pub use core::{CoreOrchestrator, OrchestratorState, RunSummary, TickDecision};
pub use runtime::ReloadOrchestrator;
pub use tokio_util::sync::CancellationToken;
