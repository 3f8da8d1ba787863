//! Step 5: Canvas checkout and example configs

use super::{CANVAS_ROOT, CANVAS_USER};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

const CANVAS_REPO: &str = "https://github.com/instructure/canvas-lms.git";
const CANVAS_BRANCH: &str = "prod";

/// Configs seeded from their `.yml.example` counterparts
pub const EXAMPLE_CONFIGS: [&str; 9] = [
    "amazon_s3",
    "database",
    "delayed_jobs",
    "vault_contents",
    "domain",
    "file_store",
    "outgoing_mail",
    "security",
    "external_migration",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CloneCanvasStep;

#[async_trait]
impl Step for CloneCanvasStep {
    fn name(&self) -> &'static str {
        "Clone & Install Canvas LMS"
    }

    fn description(&self) -> &'static str {
        "Cloning Canvas LMS"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.sh(
            "git config --global --add safe.directory '*' && \
             git config --global user.name 'Canvas Installer' && \
             git config --global user.email 'installer@canvas.local'",
            "Configuring Git",
        )
        .await?;

        if ctx.probe(&format!("test -d {}/.git", CANVAS_ROOT)).await {
            ctx.detail("Canvas checkout already present");
        } else {
            ctx.detail("Cloning Canvas repository");
            ctx.sh(
                format!("git clone {} {}", CANVAS_REPO, CANVAS_ROOT),
                "Cloning Canvas repository",
            )
            .await?;
        }
        ctx.sh(
            format!("cd {} && git checkout {}", CANVAS_ROOT, CANVAS_BRANCH),
            format!("Checking out {} branch", CANVAS_BRANCH),
        )
        .await?;

        ctx.detail("Setting up Canvas permissions");
        ctx.sh(
            format!(
                "chown -R {user}:{user} {root} && \
                 sudo -u {user} git config --global --add safe.directory {root} && \
                 sudo -u {user} git config --global user.name 'Canvas User' && \
                 sudo -u {user} git config --global user.email 'canvas@localhost'",
                user = CANVAS_USER,
                root = CANVAS_ROOT
            ),
            "Setting up ownership and permissions",
        )
        .await?;

        ctx.detail("Setting up configuration files");
        for config in EXAMPLE_CONFIGS {
            ctx.sh(
                format!(
                    "cd {root} && [ -f config/{config}.yml ] || sudo -u {user} cp config/{config}.yml.example config/{config}.yml",
                    root = CANVAS_ROOT,
                    user = CANVAS_USER,
                ),
                format!("Copying {} config", config),
            )
            .await?;
        }

        Ok(())
    }
}
