//! Step 13: Rich Content Editor API service

use super::secrets::token_hex;
use super::templates::{self, RceSecrets};
use super::{apt_install, canvas_config_path, rendered, CANVAS_USER, RCE_ROOT};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

const RCE_REPO: &str = "https://github.com/instructure/canvas-rce-api.git";

/// Installs canvas-rce-api; a no-op when the editor service is skipped
#[derive(Debug, Default, Clone, Copy)]
pub struct RichContentEditorStep;

impl RichContentEditorStep {
    fn generate_secrets() -> RceSecrets {
        RceSecrets {
            ecosystem_secret: token_hex(32),
            ecosystem_key: token_hex(32),
            cipher_password: token_hex(16),
        }
    }
}

#[async_trait]
impl Step for RichContentEditorStep {
    fn name(&self) -> &'static str {
        "Enable Rich Content Editor"
    }

    fn description(&self) -> &'static str {
        "Setting up the Rich Content Editor API"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        if ctx.config.skip_rce {
            ctx.skipped("Rich Content Editor setup disabled");
            return Ok(());
        }

        if ctx.probe(&format!("test -d {}/.git", RCE_ROOT)).await {
            ctx.detail("RCE API checkout already present");
        } else {
            ctx.detail("Cloning Canvas RCE API");
            ctx.run(
                ctx.command(format!("git clone {} {}", RCE_REPO, RCE_ROOT))
                    .describe("Cloning RCE API repository")
                    .timeout_secs(300),
            )
            .await?;
        }
        ctx.sh(
            format!("chown -R {user}:{user} {}", RCE_ROOT, user = CANVAS_USER),
            "Setting RCE API ownership",
        )
        .await?;

        ctx.detail("Installing RCE API dependencies");
        ctx.run(
            ctx.command(format!(
                "cd {} && sudo -u {} npm install --production",
                RCE_ROOT, CANVAS_USER
            ))
            .describe("Installing RCE API dependencies")
            .timeout_secs(900),
        )
        .await?;

        ctx.detail("Generating RCE secrets");
        let secrets = Self::generate_secrets();

        ctx.write_file(
            format!("{}/.env", RCE_ROOT),
            &templates::rce_env(&secrets, ctx.config),
            Some(CANVAS_USER),
        )
        .await?;

        ctx.detail("Configuring Canvas vault contents");
        let vault = rendered(
            "vault_contents.yml",
            templates::vault_contents_yml(&secrets.ecosystem_key, &secrets.ecosystem_secret),
        )?;
        ctx.write_file(
            canvas_config_path("vault_contents.yml"),
            &vault,
            Some(CANVAS_USER),
        )
        .await?;

        ctx.sh(apt_install("screen"), "Installing screen").await?;

        ctx.detail(&format!(
            "Start the RCE server with: cd {} && screen -S canvas-rce-api npm start",
            RCE_ROOT
        ));
        Ok(())
    }
}
