// src/engine/core.rs

//! Pure orchestrator state machine.
//!
//! This module contains the synchronous, deterministic part of the poll
//! loop: it compares fresh snapshots against the last adopted one, decides
//! whether a pipeline run is due, and tracks Idle / Triggered / Terminal.
//!
//! The async shell (`engine::runtime::ReloadOrchestrator`) is responsible
//! for taking snapshots, sleeping, running the pipeline and watching the
//! cancellation token. The core is unit tested without any Tokio, processes
//! or filesystem.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::errors::PollError;
use crate::pipeline::RunOutcome;
use crate::watch::{diff, ChangeSnapshot};

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Polling; nothing changed since the last adopted snapshot.
    Idle,
    /// A change was detected and the pipeline is running.
    Triggered,
    /// Cancelled; no further polling.
    Terminal,
}

/// What the core decided about one poll result.
#[derive(Debug)]
pub enum TickDecision {
    /// Snapshot equals the last one.
    Unchanged,
    /// The snapshot could not be taken; counts as "no change".
    PollFailed(PollError),
    /// At least one path changed; run the pipeline, then call
    /// [`CoreOrchestrator::finish_run`] with `snapshot`.
    Changed {
        changed: BTreeSet<PathBuf>,
        snapshot: ChangeSnapshot,
    },
}

/// Totals over the lifetime of one orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pipeline runs started (including the optional initial run).
    pub runs: usize,
    /// Step failures across all runs.
    pub failed_steps: usize,
    /// Whether the orchestrator stopped because of cancellation.
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct CoreOrchestrator {
    last: ChangeSnapshot,
    state: OrchestratorState,
    summary: RunSummary,
}

impl CoreOrchestrator {
    /// Start idle with `baseline` as the last known snapshot.
    pub fn new(baseline: ChangeSnapshot) -> Self {
        Self {
            last: baseline,
            state: OrchestratorState::Idle,
            summary: RunSummary::default(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn last_snapshot(&self) -> &ChangeSnapshot {
        &self.last
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Classify a fresh poll result.
    ///
    /// Only a `Changed` decision moves the state to `Triggered`; the last
    /// snapshot is not touched until [`finish_run`](Self::finish_run).
    pub fn observe(&mut self, polled: Result<ChangeSnapshot, PollError>) -> TickDecision {
        if self.state == OrchestratorState::Terminal {
            return TickDecision::Unchanged;
        }

        match polled {
            Err(err) => TickDecision::PollFailed(err),
            Ok(snapshot) if snapshot == self.last => TickDecision::Unchanged,
            Ok(snapshot) => {
                self.state = OrchestratorState::Triggered;
                TickDecision::Changed {
                    changed: diff(&self.last, &snapshot),
                    snapshot,
                }
            }
        }
    }

    /// Paths that differ between the last adopted snapshot and `candidate`.
    pub fn changes_since_last(&self, candidate: &ChangeSnapshot) -> BTreeSet<PathBuf> {
        diff(&self.last, candidate)
    }

    /// Record a run that was not triggered by a change (the initial run).
    pub fn record_run(&mut self, outcome: &RunOutcome) {
        self.summary.runs += 1;
        self.summary.failed_steps += outcome.report().failed();
        if outcome.is_cancelled() {
            self.terminate();
        }
    }

    /// Adopt `snapshot` after a triggered run, whatever the run's outcome.
    ///
    /// A failing pipeline is not re-run until the next edit.
    pub fn finish_run(&mut self, snapshot: ChangeSnapshot, outcome: &RunOutcome) {
        self.last = snapshot;
        self.record_run(outcome);
        if self.state != OrchestratorState::Terminal {
            self.state = OrchestratorState::Idle;
        }
    }

    /// Adopt `snapshot` without running anything (e.g. an edit that was
    /// reverted while settling).
    pub fn adopt(&mut self, snapshot: ChangeSnapshot) {
        self.last = snapshot;
        if self.state != OrchestratorState::Terminal {
            self.state = OrchestratorState::Idle;
        }
    }

    pub fn terminate(&mut self) {
        self.state = OrchestratorState::Terminal;
        self.summary.cancelled = true;
    }
}
