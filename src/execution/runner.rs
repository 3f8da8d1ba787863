//! External command execution with timeouts

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Default per-command timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// How a command's standard streams are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the installer's terminal (output streams live, prompts work)
    Inherit,
    /// Capture stdout/stderr for inspection; stdin is closed
    Capture,
}

/// A single shell command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Shell line, executed with `bash -c`
    pub command: String,

    /// Human-readable description used in logs and error messages
    pub description: String,

    /// Upper bound on how long the command may run
    pub timeout: Duration,

    /// Stream wiring
    pub output: OutputMode,

    /// Command line embeds a secret and must not be logged
    pub sensitive: bool,
}

impl CommandSpec {
    /// Create a spec with the default timeout and inherited output
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            description: command.clone(),
            command,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output: OutputMode::Inherit,
            sensitive: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Capture output instead of streaming it to the terminal
    pub fn captured(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }

    /// Keep the command line out of the log
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured stdout (empty when output was inherited)
    pub stdout: String,
    /// Captured stderr (empty when output was inherited)
    pub stderr: String,
    /// Exit code (None if terminated by signal)
    pub exit_code: Option<i32>,
}

/// Error types for command execution
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start '{description}': {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{description}' exited with code {code}{}", stderr_suffix(.stderr))]
    Failed {
        description: String,
        code: i32,
        stderr: String,
    },

    #[error("'{description}' timed out after {secs} seconds")]
    Timeout { description: String, secs: u64 },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl CommandError {
    /// Whether the command was stopped because it ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout { .. })
    }
}

/// Quote a value for safe interpolation into a `bash -c` line
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Capability the installation steps use to touch the host.
///
/// Every external effect a step has goes through this trait, which keeps
/// steps testable without a real system underneath.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command; non-zero exit and timeout are errors
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;

    /// Write a file, creating parent directories, optionally chowning it to
    /// `owner:owner`
    async fn write_file(
        &self,
        path: &Path,
        contents: &str,
        owner: Option<&str>,
    ) -> Result<(), CommandError>;

    /// Run a quiet probe command and report whether it exited successfully
    async fn succeeds(&self, command: &str) -> bool {
        self.run(&CommandSpec::new(command).captured()).await.is_ok()
    }
}

/// Runs commands through a local shell
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: String,
}

impl ShellCommandRunner {
    /// Create a runner that uses `bash`
    pub fn new() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }

    /// Use a different shell binary
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        info!("Executing: {}", spec.description);
        if !spec.sensitive {
            debug!("Command line: {}", spec.command);
        }

        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(&spec.command).kill_on_drop(true);

        match spec.output {
            OutputMode::Inherit => {
                command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
        }

        let child = command.spawn().map_err(|source| CommandError::Spawn {
            description: spec.description.clone(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match timeout(spec.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                error!("Unexpected error running command: {} - {}", spec.description, source);
                return Err(CommandError::Spawn {
                    description: spec.description.clone(),
                    source,
                });
            }
            Err(_) => {
                error!(
                    "Command timed out: {} (after {}s)",
                    spec.description,
                    spec.timeout.as_secs()
                );
                return Err(CommandError::Timeout {
                    description: spec.description.clone(),
                    secs: spec.timeout.as_secs(),
                });
            }
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };

        if !output.status.success() {
            let code = result.exit_code.unwrap_or(-1);
            error!("Command failed: {} - Exit code: {}", spec.description, code);
            if !result.stderr.trim().is_empty() {
                error!("Error output: {}", result.stderr.trim());
            }
            return Err(CommandError::Failed {
                description: spec.description.clone(),
                code,
                stderr: result.stderr,
            });
        }

        info!("Command completed successfully: {}", spec.description);
        Ok(result)
    }

    async fn write_file(
        &self,
        path: &Path,
        contents: &str,
        owner: Option<&str>,
    ) -> Result<(), CommandError> {
        info!("Writing config file {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CommandError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, contents)
            .await
            .map_err(|source| CommandError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(owner) = owner {
            let chown = CommandSpec::new(format!(
                "chown {owner}:{owner} {}",
                shell_quote(&path.display().to_string())
            ))
            .describe(format!("Setting ownership for {}", path.display()))
            .captured();
            self.run(&chown).await?;
        }

        Ok(())
    }
}
