//! Pre-flight privilege check
//!
//! Runs before the banner's prompts: the installer needs root (directly or
//! through sudo) and exits with status 1 before collecting anything if it
//! does not have it.

use crate::error::InstallerError;
use tracing::{debug, info, warn};

/// Privileges of the current process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeStatus {
    pub is_root: bool,
    /// Invoking user when started through sudo
    pub sudo_user: Option<String>,
}

impl PrivilegeStatus {
    /// Inspect the running process
    pub fn current() -> Self {
        Self {
            is_root: nix::unistd::geteuid().is_root(),
            sudo_user: std::env::var("SUDO_USER").ok().filter(|u| !u.is_empty()),
        }
    }

    /// Root, or started through sudo
    pub fn is_sufficient(&self) -> bool {
        self.is_root || self.sudo_user.is_some()
    }
}

/// Verify privileges, unless the check is explicitly skipped
pub fn check_privileges(
    status: &PrivilegeStatus,
    skip_root_check: bool,
) -> Result<(), InstallerError> {
    debug!("Running pre-flight checks (skip_root_check={})", skip_root_check);

    if skip_root_check {
        warn!("Root check skipped (CANVAS_INSTALLER_SKIP_ROOT_CHECK=1)");
        return Ok(());
    }

    if !status.is_sufficient() {
        return Err(InstallerError::Precondition(
            "This installer requires sudo privileges. Please run with sudo.".to_string(),
        ));
    }

    info!(
        "Pre-flight checks passed: root={}, sudo_user={:?}",
        status.is_root, status.sudo_user
    );
    Ok(())
}

/// Print a pre-flight failure to stderr and exit with status 1
pub fn print_error_and_exit(err: &InstallerError) -> ! {
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════╗");
    eprintln!("║       Canvas LMS Installer - Pre-flight Check Failed     ║");
    eprintln!("╚══════════════════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("❌ ERROR: {}", err);
    eprintln!();
    eprintln!("   Solution: Run with sudo or as root user:");
    eprintln!("     sudo canvas-installer");
    eprintln!();

    std::process::exit(err.exit_code());
}
