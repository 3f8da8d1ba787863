//! Test utilities shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use canvas_installer::core::{
    InstallConfig, Pipeline, ProgressState, Step, StepContext, StepError,
};
use canvas_installer::error::InstallerError;
use canvas_installer::execution::{
    CommandError, CommandOutput, CommandRunner, CommandSpec, ConfigCollector, ProgressReporter,
};
use canvas_installer::persistence::StateStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Configuration used by the end-to-end scenarios
pub fn example_config() -> InstallConfig {
    InstallConfig {
        domain: "canvas.example.com".to_string(),
        canvas_password: "s3cret".to_string(),
        skip_ssl: true,
        skip_rce: true,
        ..InstallConfig::default()
    }
}

/// Shared record of which stub steps ran, in order
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Step that records its invocation and succeeds or fails as configured
pub struct StubStep {
    name: &'static str,
    failure: Option<String>,
    calls: CallLog,
    failures_left: Arc<AtomicUsize>,
}

impl StubStep {
    pub fn ok(name: &'static str, calls: &CallLog) -> Self {
        Self {
            name,
            failure: None,
            calls: calls.clone(),
            failures_left: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fails on every invocation
    pub fn failing(name: &'static str, reason: &str, calls: &CallLog) -> Self {
        Self {
            name,
            failure: Some(reason.to_string()),
            calls: calls.clone(),
            failures_left: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    /// Fails the first `times` invocations, then succeeds
    pub fn failing_times(name: &'static str, reason: &str, times: usize, calls: &CallLog) -> Self {
        Self {
            name,
            failure: Some(reason.to_string()),
            calls: calls.clone(),
            failures_left: Arc::new(AtomicUsize::new(times)),
        }
    }
}

#[async_trait]
impl Step for StubStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "stub step"
    }

    async fn run(&self, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        self.calls.lock().unwrap().push(self.name.to_string());

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                if left == 0 {
                    None
                } else if left == usize::MAX {
                    Some(left)
                } else {
                    Some(left - 1)
                }
            })
            .is_ok();

        match (&self.failure, should_fail) {
            (Some(reason), true) => Err(StepError::Precondition(reason.clone())),
            _ => Ok(()),
        }
    }
}

/// Step that never finishes, standing in for a command cut off by Ctrl-C
pub struct HangingStep {
    name: &'static str,
    calls: CallLog,
}

impl HangingStep {
    pub fn new(name: &'static str, calls: &CallLog) -> Self {
        Self {
            name,
            calls: calls.clone(),
        }
    }
}

#[async_trait]
impl Step for HangingStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "never finishes"
    }

    async fn run(&self, _ctx: &StepContext<'_>) -> Result<(), StepError> {
        self.calls.lock().unwrap().push(self.name.to_string());
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Build a pipeline from boxed steps
pub fn pipeline_of(steps: Vec<Box<dyn Step>>) -> Pipeline {
    Pipeline::new("test", steps).unwrap()
}

/// Everything a reporter was told
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Start { name: String, position: usize, total: usize },
    Success(String),
    Failure { name: String, reason: String },
    Complete(String),
    Detail { name: String, detail: String },
    Skipped { name: String, reason: String },
    Resume { position: usize, total: usize },
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Report> {
        self.events.lock().unwrap().clone()
    }

    /// Step names passed to `on_step_start`, in order
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Report::Start { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Step names passed to `on_step_success`, in order
    pub fn succeeded(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Report::Success(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Report::Failure { name, reason } => Some((name, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Report::Skipped { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, Report::Complete(_)))
    }

    fn push(&self, report: Report) {
        self.events.lock().unwrap().push(report);
    }
}

impl ProgressReporter for RecordingReporter {
    fn on_step_start(&self, name: &str, position: usize, total: usize) {
        self.push(Report::Start {
            name: name.to_string(),
            position,
            total,
        });
    }

    fn on_step_success(&self, name: &str) {
        self.push(Report::Success(name.to_string()));
    }

    fn on_step_failure(&self, name: &str, reason: &str) {
        self.push(Report::Failure {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    fn on_pipeline_complete(&self, message: &str) {
        self.push(Report::Complete(message.to_string()));
    }

    fn on_step_detail(&self, name: &str, detail: &str) {
        self.push(Report::Detail {
            name: name.to_string(),
            detail: detail.to_string(),
        });
    }

    fn on_step_skipped(&self, name: &str, reason: &str) {
        self.push(Report::Skipped {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    fn on_resume(&self, position: usize, total: usize) {
        self.push(Report::Resume { position, total });
    }
}

/// Collector that returns a fixed config and a fixed resume answer
pub struct ScriptedCollector {
    config: InstallConfig,
    resume: bool,
    abort: bool,
    collect_calls: AtomicUsize,
    resume_prompts: AtomicUsize,
}

impl ScriptedCollector {
    pub fn new(config: InstallConfig) -> Self {
        Self {
            config,
            resume: true,
            abort: false,
            collect_calls: AtomicUsize::new(0),
            resume_prompts: AtomicUsize::new(0),
        }
    }

    /// Answer "no" when asked to resume
    pub fn declining_resume(mut self) -> Self {
        self.resume = false;
        self
    }

    /// Behave like a user pressing Ctrl-C at the first prompt
    pub fn aborting(mut self) -> Self {
        self.abort = true;
        self
    }

    pub fn collect_calls(&self) -> usize {
        self.collect_calls.load(Ordering::SeqCst)
    }

    pub fn resume_prompts(&self) -> usize {
        self.resume_prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigCollector for ScriptedCollector {
    async fn collect(&self) -> Result<InstallConfig, InstallerError> {
        self.collect_calls.fetch_add(1, Ordering::SeqCst);
        if self.abort {
            return Err(InstallerError::ConfigCollectionAborted);
        }
        Ok(self.config.clone())
    }

    async fn confirm_resume(&self, _prior: &ProgressState) -> Result<bool, InstallerError> {
        self.resume_prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self.resume)
    }
}

/// Command runner that records everything and touches nothing
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<CommandSpec>>,
    probes: Mutex<Vec<String>>,
    written: Mutex<Vec<(PathBuf, String, Option<String>)>>,
    fail_matching: Option<String>,
    probes_succeed: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose line contains `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_matching: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Make every existence probe report success
    pub fn with_probes_succeeding(mut self) -> Self {
        self.probes_succeed = true;
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|spec| spec.command.clone())
            .collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap().clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _, _)| path.clone())
            .collect()
    }

    pub fn written(&self, path: &str) -> Option<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _, _)| p == Path::new(path))
            .map(|(_, contents, _)| contents.clone())
    }

    /// Total number of interactions of any kind
    pub fn total_calls(&self) -> usize {
        self.commands.lock().unwrap().len()
            + self.probes.lock().unwrap().len()
            + self.written.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.commands.lock().unwrap().push(spec.clone());
        if let Some(needle) = &self.fail_matching {
            if spec.command.contains(needle.as_str()) {
                return Err(CommandError::Failed {
                    description: spec.description.clone(),
                    code: 1,
                    stderr: String::new(),
                });
            }
        }
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }

    async fn write_file(
        &self,
        path: &Path,
        contents: &str,
        owner: Option<&str>,
    ) -> Result<(), CommandError> {
        self.written.lock().unwrap().push((
            path.to_path_buf(),
            contents.to_string(),
            owner.map(str::to_string),
        ));
        Ok(())
    }

    async fn succeeds(&self, command: &str) -> bool {
        self.probes.lock().unwrap().push(command.to_string());
        self.probes_succeed
    }
}

/// State store whose writes always fail
#[derive(Default)]
pub struct BrokenStateStore;

#[async_trait]
impl StateStore for BrokenStateStore {
    async fn save(&self, _state: &ProgressState) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    async fn load(&self) -> Option<ProgressState> {
        None
    }

    async fn clear(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
