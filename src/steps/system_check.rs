//! Step 1: host prerequisites

use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;
use tracing::{info, warn};

/// Minimum usable RAM; 8 GiB with some margin
pub const MIN_RAM_GIB: f64 = 7.5;
pub const MIN_CPUS: usize = 4;
pub const MIN_FREE_DISK_GB: f64 = 30.0;

/// Result of one prerequisite check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Value of a key in `/etc/os-release`, unquoted
fn os_release_value<'a>(os_release: &'a str, key: &str) -> Option<&'a str> {
    os_release.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"'))
    })
}

/// Whether `/etc/os-release` describes Ubuntu 22.04
pub fn is_supported_os(os_release: &str) -> bool {
    os_release_value(os_release, "ID") == Some("ubuntu")
        && os_release_value(os_release, "VERSION_ID") == Some("22.04")
}

/// `MemTotal` from `/proc/meminfo`, in KiB
pub fn parse_mem_total_kib(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kib| kib.parse().ok())
}

/// Available space from `df -BG /` output, in GB
pub fn parse_df_available_gb(df: &str) -> Option<f64> {
    df.lines()
        .nth(1)
        .and_then(|line| line.split_whitespace().nth(3))
        .and_then(|avail| avail.trim_end_matches('G').parse().ok())
}

/// Verifies OS, privileges, hardware, connectivity and disk space
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrerequisitesStep;

impl SystemPrerequisitesStep {
    async fn captured(ctx: &StepContext<'_>, command: &str) -> Option<String> {
        ctx.run(ctx.command(command).describe(command).captured())
            .await
            .map(|out| out.stdout)
            .map_err(|e| warn!("Prerequisite probe failed: {}", e))
            .ok()
    }

    async fn check_os(ctx: &StepContext<'_>) -> CheckOutcome {
        match Self::captured(ctx, "cat /etc/os-release").await {
            Some(content) if is_supported_os(&content) => {
                CheckOutcome::pass("Operating System", "Ubuntu 22.04 LTS detected")
            }
            Some(_) => CheckOutcome::fail("Operating System", "Ubuntu 22.04 LTS required"),
            None => CheckOutcome::fail("Operating System", "Cannot determine OS version"),
        }
    }

    async fn check_sudo(ctx: &StepContext<'_>) -> CheckOutcome {
        if ctx.probe("sudo -n true").await {
            CheckOutcome::pass("Root/Sudo Access", "Sudo access confirmed")
        } else {
            CheckOutcome::fail("Root/Sudo Access", "Sudo access required")
        }
    }

    async fn check_hardware(ctx: &StepContext<'_>) -> CheckOutcome {
        const NAME: &str = "Hardware Requirements";

        let mem_gib = match Self::captured(ctx, "cat /proc/meminfo")
            .await
            .as_deref()
            .and_then(parse_mem_total_kib)
        {
            Some(kib) => kib as f64 / 1024.0 / 1024.0,
            None => return CheckOutcome::fail(NAME, "Cannot verify hardware specs"),
        };
        if mem_gib < MIN_RAM_GIB {
            return CheckOutcome::fail(NAME, format!("RAM: {:.1}GB (8GB required)", mem_gib));
        }

        let cpus = match Self::captured(ctx, "nproc")
            .await
            .and_then(|out| out.trim().parse::<usize>().ok())
        {
            Some(cpus) => cpus,
            None => return CheckOutcome::fail(NAME, "Cannot verify hardware specs"),
        };
        if cpus < MIN_CPUS {
            return CheckOutcome::fail(
                NAME,
                format!("CPU: {} cores ({} required)", cpus, MIN_CPUS),
            );
        }

        CheckOutcome::pass(NAME, format!("RAM: {:.1}GB, CPU: {} cores", mem_gib, cpus))
    }

    async fn check_internet(ctx: &StepContext<'_>) -> CheckOutcome {
        let ping = ctx
            .command("ping -c 1 google.com")
            .describe("Checking internet connectivity")
            .timeout_secs(10)
            .captured();
        if ctx.run(ping).await.is_ok() {
            CheckOutcome::pass("Internet Connectivity", "Internet connection verified")
        } else {
            CheckOutcome::fail("Internet Connectivity", "No internet connection")
        }
    }

    async fn check_disk(ctx: &StepContext<'_>) -> CheckOutcome {
        match Self::captured(ctx, "df -BG /")
            .await
            .as_deref()
            .and_then(parse_df_available_gb)
        {
            Some(gb) if gb < MIN_FREE_DISK_GB => CheckOutcome::fail(
                "Disk Space",
                format!("Available: {}G (30GB required)", gb),
            ),
            Some(gb) => CheckOutcome::pass("Disk Space", format!("Available: {}G", gb)),
            None => CheckOutcome::fail("Disk Space", "Cannot determine disk space"),
        }
    }
}

#[async_trait]
impl Step for SystemPrerequisitesStep {
    fn name(&self) -> &'static str {
        "System Prerequisites Check"
    }

    fn description(&self) -> &'static str {
        "Checking system prerequisites"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let checks = vec![
            Self::check_os(ctx).await,
            Self::check_sudo(ctx).await,
            Self::check_hardware(ctx).await,
            Self::check_internet(ctx).await,
            Self::check_disk(ctx).await,
        ];

        for check in &checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            info!("{} [{}] {}", check.name, status, check.detail);
            ctx.detail(&format!("{:<22} {}  {}", check.name, status, check.detail));
        }

        let failed: Vec<String> = checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| format!("{} ({})", c.name, c.detail))
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(StepError::Precondition(format!(
                "prerequisites not met: {}",
                failed.join("; ")
            )))
        }
    }
}
