//! Step 14: ownership, permissions and download optimization

use super::templates::PRODUCTION_LOCAL_RB;
use super::{apt_install, CANVAS_ROOT, CANVAS_USER};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct FinalizeStep;

#[async_trait]
impl Step for FinalizeStep {
    fn name(&self) -> &'static str {
        "Set Permissions & Optimization"
    }

    fn description(&self) -> &'static str {
        "Finalizing installation"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Setting file permissions");
        ctx.sh(
            format!("chown -R {user}:{user} {root}", user = CANVAS_USER, root = CANVAS_ROOT),
            "Setting permissions",
        )
        .await?;

        if ctx.config.skip_optimization {
            ctx.detail("File download optimization disabled");
        } else {
            ctx.detail("Setting up file download optimization");
            ctx.sh(apt_install("libapache2-mod-xsendfile"), "Optimization setup")
                .await?;
            ctx.sh("systemctl reload apache2", "Optimization setup")
                .await?;
            ctx.write_file(
                format!("{}/config/environments/production-local.rb", CANVAS_ROOT),
                PRODUCTION_LOCAL_RB,
                Some(CANVAS_USER),
            )
            .await?;
        }

        // After every config file is in place, including production-local.rb.
        ctx.sh(
            format!("find {}/config/ -type f -exec chmod 400 {{}} +", CANVAS_ROOT),
            "Restricting config file permissions",
        )
        .await?;

        ctx.detail("Restarting services");
        ctx.sh("systemctl restart apache2", "Restarting Apache").await?;
        ctx.sh("systemctl restart redis-server", "Restarting Redis")
            .await?;
        Ok(())
    }
}
