//! Runtime settings for the installer binary

use crate::execution::DEFAULT_TIMEOUT_SECS;
use crate::persistence::store::DEFAULT_STATE_FILE;
use std::path::PathBuf;
use std::time::Duration;

pub const STATE_FILE_ENV: &str = "CANVAS_INSTALLER_STATE_FILE";
pub const LOG_DIR_ENV: &str = "CANVAS_INSTALLER_LOG_DIR";
pub const SKIP_ROOT_CHECK_ENV: &str = "CANVAS_INSTALLER_SKIP_ROOT_CHECK";

/// Where the installer keeps its files and how long commands may run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerSettings {
    /// Progress state file
    pub state_file: PathBuf,

    /// Directory the run log is created in
    pub log_dir: PathBuf,

    /// Timeout for commands that do not set their own
    pub default_timeout: Duration,

    /// Skip the privilege check (development only)
    pub skip_root_check: bool,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            log_dir: PathBuf::from("."),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            skip_root_check: false,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl InstallerSettings {
    /// Defaults, overridden by `CANVAS_INSTALLER_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(path) = lookup(STATE_FILE_ENV).filter(|v| !v.is_empty()) {
            settings.state_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup(LOG_DIR_ENV).filter(|v| !v.is_empty()) {
            settings.log_dir = PathBuf::from(dir);
        }
        settings.skip_root_check = lookup(SKIP_ROOT_CHECK_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        settings
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}
