// src/engine/runtime.rs

use std::fmt;
use std::io::Write;
use std::time::Duration;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{HotloadError, Result};
use crate::pipeline::{Pipeline, ReloadContext, RunOutcome, StepEnv};
use crate::unit::{resolve_changed_units, UnitRegistry};
use crate::watch::{ChangeSnapshot, ChangeTracker, WatchSet};

use super::core::{CoreOrchestrator, OrchestratorState, RunSummary, TickDecision};
use super::{OrchestratorOptions, TickOutcome};

/// Polls the watch set and runs the pipeline whenever something changed.
///
/// This is the async shell around [`CoreOrchestrator`]: it owns the
/// watch set, the pipeline and the unit registry, takes snapshots, sleeps
/// between ticks and honours the cancellation token. Everything runs on the
/// caller's task; nothing is spawned.
pub struct ReloadOrchestrator<R: UnitRegistry> {
    watch_set: WatchSet,
    tracker: ChangeTracker,
    pipeline: Pipeline,
    registry: R,
    options: OrchestratorOptions,
    cancel: CancellationToken,
    console: Box<dyn Write + Send>,
    resolve_units: bool,
    core: Option<CoreOrchestrator>,
}

impl<R: UnitRegistry> fmt::Debug for ReloadOrchestrator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadOrchestrator")
            .field("watch_set", &self.watch_set.len())
            .field("pipeline", &self.pipeline.len())
            .field("options", &self.options)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<R: UnitRegistry> ReloadOrchestrator<R> {
    pub fn new(
        watch_set: WatchSet,
        tracker: ChangeTracker,
        pipeline: Pipeline,
        registry: R,
        options: OrchestratorOptions,
        cancel: CancellationToken,
    ) -> Self {
        // A dependency-reload step is useless without a context to read.
        let resolve_units = options.recursive || pipeline.reloads_dependencies();
        Self {
            watch_set,
            tracker,
            pipeline,
            registry,
            options,
            cancel,
            console: Box::new(std::io::stdout()),
            resolve_units,
            core: None,
        }
    }

    /// Send terminal output (clear sequences, reload notices) somewhere other
    /// than stdout.
    pub fn with_console(mut self, console: Box<dyn Write + Send>) -> Self {
        self.console = console;
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> Option<OrchestratorState> {
        self.core.as_ref().map(CoreOrchestrator::state)
    }

    pub fn summary(&self) -> RunSummary {
        self.core
            .as_ref()
            .map(CoreOrchestrator::summary)
            .unwrap_or_default()
    }

    /// Take the baseline snapshot and, if configured, run the pipeline once.
    ///
    /// A baseline that cannot be taken is a startup error.
    pub async fn start(&mut self) -> Result<()> {
        let baseline = self.tracker.snapshot(&self.watch_set).await?;
        info!(paths = baseline.len(), "baseline snapshot taken");
        self.core = Some(CoreOrchestrator::new(baseline));

        if self.options.run_once_first {
            info!("running pipeline once before polling");
            let outcome = self.run_pipeline(ReloadContext::empty()).await;
            self.core_mut()?.record_run(&outcome);
        }
        Ok(())
    }

    /// One poll iteration, without the trailing sleep.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        if self.cancel.is_cancelled() {
            self.core_mut()?.terminate();
            return Ok(TickOutcome::Cancelled);
        }

        let polled = self.tracker.snapshot(&self.watch_set).await;
        let decision = self.core_mut()?.observe(polled);

        let snapshot = match decision {
            TickDecision::Unchanged => return Ok(TickOutcome::Idle),
            TickDecision::PollFailed(err) => {
                warn!(error = %err, "poll failed; treating tick as unchanged");
                return Ok(TickOutcome::PollFailed);
            }
            TickDecision::Changed { snapshot, .. } => snapshot,
        };

        let snapshot = if self.options.settle.is_zero() {
            snapshot
        } else {
            match self.settle(snapshot).await {
                Some(settled) => settled,
                None => {
                    self.core_mut()?.terminate();
                    return Ok(TickOutcome::Cancelled);
                }
            }
        };

        let changed = self.core_mut()?.changes_since_last(&snapshot);
        if changed.is_empty() {
            debug!("edits reverted while settling; nothing to run");
            self.core_mut()?.adopt(snapshot);
            return Ok(TickOutcome::Idle);
        }
        info!(changed = ?changed, "change detected");

        let context = if self.resolve_units {
            ReloadContext::new(resolve_changed_units(&self.registry, &changed))
        } else {
            ReloadContext::empty()
        };

        let outcome = self.run_pipeline(context.clone()).await;
        let failed_steps = outcome.report().failed();
        let cancelled = outcome.is_cancelled();
        self.core_mut()?.finish_run(snapshot, &outcome);

        Ok(TickOutcome::Ran {
            changed,
            context,
            failed_steps,
            cancelled,
        })
    }

    /// Start, then poll until cancelled.
    ///
    /// With `exit_after_first_run` this returns right after [`start`](Self::start).
    pub async fn run(&mut self) -> Result<RunSummary> {
        info!(
            paths = self.watch_set.len(),
            steps = self.pipeline.len(),
            poll_interval = ?self.options.poll_interval,
            recursive = self.resolve_units,
            "hotload orchestrator started"
        );

        if self.core.is_none() {
            self.start().await?;
        }

        if self.options.exit_after_first_run {
            return Ok(self.summary());
        }

        loop {
            match self.tick().await? {
                TickOutcome::Idle | TickOutcome::PollFailed => {
                    if !self.sleep_or_cancel(self.options.poll_interval).await {
                        self.core_mut()?.terminate();
                        break;
                    }
                }
                TickOutcome::Ran { cancelled, .. } => {
                    if cancelled {
                        break;
                    }
                }
                TickOutcome::Cancelled => break,
            }
        }

        info!("interrupt received, stopping hotload");
        Ok(self.summary())
    }

    async fn run_pipeline(&mut self, context: ReloadContext) -> RunOutcome {
        let mut env = StepEnv::new(&mut self.registry, self.console.as_mut());
        self.pipeline.run(&context, &mut env, &self.cancel).await
    }

    /// Re-snapshot every `settle` until two consecutive snapshots agree.
    ///
    /// Returns `None` if cancelled while waiting.
    async fn settle(&mut self, mut candidate: ChangeSnapshot) -> Option<ChangeSnapshot> {
        loop {
            if !self.sleep_or_cancel(self.options.settle).await {
                return None;
            }
            match self.tracker.snapshot(&self.watch_set).await {
                Ok(next) if next == candidate => return Some(candidate),
                Ok(next) => {
                    debug!("still changing; waiting for edits to settle");
                    candidate = next;
                }
                Err(err) => debug!(error = %err, "poll failed while settling"),
            }
        }
    }

    /// Sleep for `duration`; returns `false` if cancelled first.
    async fn sleep_or_cancel(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn core_mut(&mut self) -> Result<&mut CoreOrchestrator> {
        self.core
            .as_mut()
            .ok_or_else(|| HotloadError::Other(anyhow!("orchestrator polled before start()")))
    }
}
