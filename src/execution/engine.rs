//! Orchestrator - drives the pipeline and keeps progress resumable

use crate::{
    core::{InstallConfig, Pipeline, ProgressState, RunOutcome, StepContext, StepResult},
    error::InstallerError,
    execution::runner::{CommandRunner, DEFAULT_TIMEOUT_SECS},
    persistence::StateStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Source of the installation configuration
#[async_trait]
pub trait ConfigCollector: Send + Sync {
    /// Gather a fully populated configuration for a fresh run
    async fn collect(&self) -> Result<InstallConfig, InstallerError>;

    /// Decide whether to continue from saved progress
    async fn confirm_resume(&self, prior: &ProgressState) -> Result<bool, InstallerError>;
}

/// Receives progress notifications from the orchestrator
pub trait ProgressReporter: Send + Sync {
    /// A step is about to run (`position` is 1-based)
    fn on_step_start(&self, name: &str, position: usize, total: usize);

    fn on_step_success(&self, name: &str);

    fn on_step_failure(&self, name: &str, reason: &str);

    /// Every step has succeeded
    fn on_pipeline_complete(&self, message: &str);

    /// Sub-progress inside a running step
    fn on_step_detail(&self, _name: &str, _detail: &str) {}

    /// A step opted out of its work
    fn on_step_skipped(&self, _name: &str, _reason: &str) {}

    /// A saved run is being continued at `position` (1-based)
    fn on_resume(&self, _position: usize, _total: usize) {}
}

/// Runs a pipeline in order, persisting progress after every step
pub struct Orchestrator<S> {
    pipeline: Pipeline,
    store: S,
    runner: Arc<dyn CommandRunner>,
    default_timeout: Duration,
}

impl<S: StateStore> Orchestrator<S> {
    pub fn new(pipeline: Pipeline, store: S, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            pipeline,
            store,
            runner,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the timeout commands get when a step does not choose one
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Access the state store (mainly for inspection)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load saved progress and ask whether to continue it.
    ///
    /// Returns `None` for a fresh run; declined or unusable progress is
    /// discarded.
    async fn resume_point(
        &self,
        collector: &dyn ConfigCollector,
    ) -> Result<Option<ProgressState>, InstallerError> {
        let Some(prior) = self.store.load().await else {
            return Ok(None);
        };

        let total = self.pipeline.len();
        if prior.current_step_index > total {
            warn!(
                "Saved progress points at step index {} but the pipeline has {} steps; starting over",
                prior.current_step_index, total
            );
            self.discard_progress().await;
            return Ok(None);
        }

        if collector.confirm_resume(&prior).await? {
            Ok(Some(prior))
        } else {
            info!("Previous progress declined; starting from the first step");
            self.discard_progress().await;
            Ok(None)
        }
    }

    async fn discard_progress(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to discard saved progress: {:#}", e);
        }
    }

    /// Run the pipeline, resuming saved progress when the collector agrees.
    ///
    /// A step failure is a normal [`RunOutcome::Failed`]; `Err` is reserved
    /// for problems before the first step runs (e.g. aborted prompts).
    pub async fn run_pipeline(
        &self,
        collector: &dyn ConfigCollector,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunOutcome, InstallerError> {
        let total = self.pipeline.len();

        let (run_id, config, start) = match self.resume_point(collector).await? {
            Some(prior) => {
                info!(
                    "Resuming run {} from step {} of {}",
                    prior.run_id,
                    prior.resume_position(),
                    total
                );
                reporter.on_resume(prior.resume_position(), total);
                (prior.run_id, prior.config, prior.current_step_index)
            }
            None => {
                let config = collector.collect().await?;
                let run_id = Uuid::new_v4();
                info!("Starting run {} for {}", run_id, config.domain);
                (run_id, config, 0)
            }
        };

        for (index, step) in self.pipeline.steps().enumerate().skip(start) {
            let name = step.name();
            reporter.on_step_start(name, index + 1, total);

            let ctx = StepContext::new(&config, self.runner.as_ref(), reporter, name)
                .with_default_timeout(self.default_timeout);

            match step.execute(&ctx).await {
                StepResult::Success => {
                    let progress = ProgressState::new(run_id, index + 1, config.clone());
                    if let Err(e) = self.store.save(&progress).await {
                        let reason = format!("could not persist progress: {:#}", e);
                        error!("Step {} succeeded but {}", name, reason);
                        reporter.on_step_failure(name, &reason);
                        return Ok(RunOutcome::Failed {
                            step_index: index,
                            step_name: name.to_string(),
                            reason,
                        });
                    }
                    reporter.on_step_success(name);
                }
                StepResult::Failure { reason } => {
                    error!("Installation failed at step {}: {}", name, reason);
                    reporter.on_step_failure(name, &reason);
                    return Ok(RunOutcome::Failed {
                        step_index: index,
                        step_name: name.to_string(),
                        reason,
                    });
                }
            }
        }

        if let Err(e) = self.store.clear().await {
            warn!("Installation finished but saved progress could not be removed: {:#}", e);
        }

        info!("Run {} completed all {} steps", run_id, total);
        reporter.on_pipeline_complete(&self.pipeline.completion_message(&config));
        Ok(RunOutcome::Completed)
    }
}
