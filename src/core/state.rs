//! Persisted progress and run outcome models

use crate::core::config::InstallConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable record of how far an installation has progressed.
///
/// `current_step_index` is the index of the NEXT step to run: every step
/// below it has already completed successfully in this or an earlier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Identifier of the run that first collected this configuration
    #[serde(default = "Uuid::new_v4")]
    pub run_id: Uuid,

    /// Index of the next step to execute
    pub current_step_index: usize,

    /// Configuration snapshot the run was started with
    pub config: InstallConfig,

    /// When this record was written (ISO-8601 in the file)
    pub timestamp: DateTime<Utc>,
}

impl ProgressState {
    /// Create a progress record stamped with the current time
    pub fn new(run_id: Uuid, current_step_index: usize, config: InstallConfig) -> Self {
        Self {
            run_id,
            current_step_index,
            config,
            timestamp: Utc::now(),
        }
    }

    /// 1-based position of the step a resume would start at
    pub fn resume_position(&self) -> usize {
        self.current_step_index + 1
    }
}

/// Final result of a `run_pipeline` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step succeeded and saved progress was cleared
    Completed,

    /// A step failed; saved progress still points at it
    Failed {
        step_index: usize,
        step_name: String,
        reason: String,
    },
}

impl RunOutcome {
    /// Check if the run completed
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }

    /// Process exit status for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Failed { .. } => 1,
        }
    }
}
