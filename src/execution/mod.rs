//! Pipeline execution: command running and orchestration

pub mod engine;
pub mod runner;

pub use engine::{ConfigCollector, Orchestrator, ProgressReporter};
pub use runner::{
    shell_quote, CommandError, CommandOutput, CommandRunner, CommandSpec, OutputMode,
    ShellCommandRunner, DEFAULT_TIMEOUT_SECS,
};
