//! canvas-installer - a guided, resumable Canvas LMS installer
//!
//! The installation is a fixed pipeline of steps. The [`Orchestrator`] runs
//! them in order and persists progress after each one, so a failed or
//! interrupted run picks up again at the step that did not finish.

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod logging;
pub mod persistence;
pub mod preflight;
pub mod settings;
pub mod steps;

// Re-export commonly used types
pub use crate::core::{InstallConfig, Pipeline, ProgressState, RunOutcome, Step, StepContext, StepError, StepResult};
pub use error::InstallerError;
pub use execution::{CommandRunner, CommandSpec, ConfigCollector, Orchestrator, ProgressReporter, ShellCommandRunner};
pub use persistence::{InMemoryStateStore, JsonFileStateStore, StateStore};
pub use settings::InstallerSettings;
pub use steps::canvas_pipeline;
