//! Per-step execution context
//!
//! Everything a step may read or use is handed to it through
//! [`StepContext`]; there is no ambient installer state.

use crate::core::config::InstallConfig;
use crate::execution::engine::ProgressReporter;
use crate::execution::runner::{CommandError, CommandOutput, CommandRunner, CommandSpec};
use std::path::Path;
use std::time::Duration;

/// Borrowed view of the run a step executes in
pub struct StepContext<'a> {
    /// Configuration collected for this run (read-only)
    pub config: &'a InstallConfig,

    runner: &'a dyn CommandRunner,
    reporter: &'a dyn ProgressReporter,
    step_name: &'a str,
    default_timeout: Duration,
}

impl<'a> StepContext<'a> {
    pub fn new(
        config: &'a InstallConfig,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn ProgressReporter,
        step_name: &'a str,
    ) -> Self {
        Self {
            config,
            runner,
            reporter,
            step_name,
            default_timeout: Duration::from_secs(crate::execution::runner::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the timeout applied by [`StepContext::command`]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Name of the step this context was created for
    pub fn step_name(&self) -> &str {
        self.step_name
    }

    /// Start a command spec carrying this run's default timeout
    pub fn command(&self, command: impl Into<String>) -> CommandSpec {
        CommandSpec::new(command).with_timeout(self.default_timeout)
    }

    /// Run a command through the runner
    pub async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, CommandError> {
        self.runner.run(&spec).await
    }

    /// Run a command line with a description and the default timeout
    pub async fn sh(
        &self,
        command: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<CommandOutput, CommandError> {
        self.run(self.command(command).describe(description)).await
    }

    /// Whether a quiet probe command exits successfully
    pub async fn probe(&self, command: &str) -> bool {
        self.runner.succeeds(command).await
    }

    /// Write a generated file, optionally owned by `owner:owner`
    pub async fn write_file(
        &self,
        path: impl AsRef<Path>,
        contents: &str,
        owner: Option<&str>,
    ) -> Result<(), CommandError> {
        self.runner.write_file(path.as_ref(), contents, owner).await
    }

    /// Report sub-progress inside the current step
    pub fn detail(&self, message: &str) {
        self.reporter.on_step_detail(self.step_name, message);
    }

    /// Report that the step opted out of its work
    pub fn skipped(&self, reason: &str) {
        self.reporter.on_step_skipped(self.step_name, reason);
    }
}
