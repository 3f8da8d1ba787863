//! Step contract shared by every installation stage

use crate::core::context::StepContext;
use crate::execution::runner::CommandError;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Success,
    Failure { reason: String },
}

impl StepResult {
    /// Create a failure with a human-readable cause
    pub fn failure(reason: impl Into<String>) -> Self {
        StepResult::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepResult::Success)
    }

    /// Failure cause, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            StepResult::Success => None,
            StepResult::Failure { reason } => Some(reason),
        }
    }
}

impl From<Result<(), StepError>> for StepResult {
    fn from(result: Result<(), StepError>) -> Self {
        match result {
            Ok(()) => StepResult::Success,
            Err(err) => StepResult::failure(err.to_string()),
        }
    }
}

/// Anything that can go wrong inside a step
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A check the step performs on the host did not pass
    #[error("{0}")]
    Precondition(String),

    #[error("failed to render {file}: {source}")]
    Template {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One unit of the installation pipeline.
///
/// Implementors provide `run`; the orchestrator calls `execute`, which turns
/// any error into a [`StepResult::Failure`] so nothing escapes the step
/// boundary.
///
/// `run` must be safe to call again after it failed part way through: a
/// resumed installation re-runs the failed step from the top.
#[async_trait]
pub trait Step: Send + Sync {
    /// Stable display name, unique within a pipeline
    fn name(&self) -> &'static str;

    /// One-line summary of what the step does
    fn description(&self) -> &'static str;

    /// Perform the step's effects
    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError>;

    /// Run the step and convert its outcome into a [`StepResult`]
    async fn execute(&self, ctx: &StepContext<'_>) -> StepResult {
        info!("Starting step: {}", self.name());
        match self.run(ctx).await {
            Ok(()) => {
                info!("Step completed successfully: {}", self.name());
                StepResult::Success
            }
            Err(err) => {
                error!("Step failed: {} - {}", self.name(), err);
                StepResult::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_result_from_ok() {
        let result: StepResult = Ok(()).into();
        assert!(result.is_success());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_timeout_reason_is_specific() {
        let err = StepError::Command(CommandError::Timeout {
            description: "Installing Ruby gems".to_string(),
            secs: 3600,
        });
        let result: StepResult = Err(err).into();
        let reason = result.reason().unwrap();
        assert!(reason.contains("timed out"));
        assert!(reason.contains("Installing Ruby gems"));
    }

    #[test]
    fn test_precondition_reason_is_verbatim() {
        let result: StepResult =
            Err(StepError::Precondition("Ubuntu 22.04 LTS required".to_string())).into();
        assert_eq!(
            result,
            StepResult::failure("Ubuntu 22.04 LTS required")
        );
    }
}
