//! Step 10: Apache virtual hosts for Canvas

use super::templates;
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

const SITES_AVAILABLE: &str = "/etc/apache2/sites-available";
const DEFAULT_SITES: [&str; 3] = ["000-default", "default-ssl", "000-default-le-ssl"];

#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualHostsStep;

#[async_trait]
impl Step for VirtualHostsStep {
    fn name(&self) -> &'static str {
        "Configure Virtual Hosts"
    }

    fn description(&self) -> &'static str {
        "Configuring virtual hosts"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let domain = &ctx.config.domain;

        ctx.detail("Disabling default Apache sites");
        for site in DEFAULT_SITES {
            ctx.sh(
                format!("a2dissite {} 2>/dev/null || true", site),
                format!("Disabling {}", site),
            )
            .await?;
        }

        ctx.detail("Creating Canvas virtual host");
        ctx.write_file(
            format!("{}/canvas.conf", SITES_AVAILABLE),
            &templates::http_vhost(domain),
            None,
        )
        .await?;

        if !ctx.config.skip_ssl {
            ctx.detail("Creating Canvas HTTPS virtual host");
            ctx.write_file(
                format!("{}/canvas-ssl.conf", SITES_AVAILABLE),
                &templates::https_vhost(domain),
                None,
            )
            .await?;
            ctx.sh("a2ensite canvas-ssl.conf", "Enabling HTTPS site").await?;
        }

        ctx.sh("a2ensite canvas.conf", "Enabling Canvas HTTP site").await?;
        ctx.sh("systemctl restart apache2", "Restarting Apache").await?;
        Ok(())
    }
}
