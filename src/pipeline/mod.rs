// src/pipeline/mod.rs

//! Ordered, failure-isolated sequence of steps run once per trigger.
//!
//! - [`step`] defines the closed set of step kinds and how each one runs.
//! - [`context`] holds the per-run `ReloadContext` and the `StepEnv`
//!   collaborators.
//! - [`build`] turns validated config into a concrete `Pipeline`.
//!
//! Failure of one step never stops the run: it is recorded in the
//! [`RunReport`] and the next step starts. Only the cancellation token can
//! cut a run short, and it is only checked between steps.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::StepError;
use crate::unit::UnitRegistry;

pub mod build;
pub mod context;
pub mod step;
pub mod terminal;

pub use build::build_pipeline;
pub use context::{ReloadContext, StepEnv};
pub use step::{Callback, Hook, Step};

/// A step that failed during one run.
#[derive(Debug)]
pub struct StepFailure {
    /// Position of the step in the pipeline.
    pub index: usize,
    /// The step's [`Step::describe`] output.
    pub step: String,
    pub error: StepError,
}

/// What happened during one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Steps that were started (successfully or not).
    pub attempted: usize,
    pub failures: Vec<StepFailure>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every step was attempted.
    Completed(RunReport),
    /// Cancellation was observed before all steps were attempted.
    Cancelled(RunReport),
}

impl RunOutcome {
    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Completed(report) | RunOutcome::Cancelled(report) => report,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled(_))
    }
}

#[derive(Debug, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether any step consumes the changed-unit context.
    pub fn reloads_dependencies(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, Step::ReloadChangedDependencies { .. }))
    }

    /// Run every step in order.
    pub async fn run<R>(
        &mut self,
        ctx: &ReloadContext,
        env: &mut StepEnv<'_, R>,
        cancel: &CancellationToken,
    ) -> RunOutcome
    where
        R: UnitRegistry + ?Sized,
    {
        let started = Instant::now();
        let total = self.steps.len();
        let mut report = RunReport::default();

        for (index, step) in self.steps.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    skipped = total - index,
                    "cancellation requested; skipping remaining steps"
                );
                return RunOutcome::Cancelled(report);
            }

            debug!(index, step = %step.describe(), "running step");
            report.attempted += 1;

            if let Err(err) = step.run(ctx, env).await {
                let name = step.describe();
                error!(index, step = %name, error = %err, "error running step");
                report.failures.push(StepFailure {
                    index,
                    step: name,
                    error: err,
                });
            }
        }

        let elapsed_ms = started.elapsed().as_millis();
        if report.failures.is_empty() {
            info!(steps = total, elapsed_ms, "pipeline run finished");
        } else {
            info!(
                steps = total,
                failed = report.failed(),
                elapsed_ms,
                "pipeline run finished; {} step(s) failed",
                report.failed()
            );
        }

        RunOutcome::Completed(report)
    }
}
