//! Core domain models for the installer
//!
//! This module defines the configuration record, the step contract, the
//! pipeline definition, and persisted progress.

pub mod config;
pub mod context;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{ConfigValidationError, InstallConfig};
pub use context::StepContext;
pub use pipeline::{Pipeline, PipelineError};
pub use state::{ProgressState, RunOutcome};
pub use step::{Step, StepError, StepResult};
