//! Step 9: Let's Encrypt certificate

use super::apt_install;
use crate::core::{Step, StepContext, StepError};
use crate::execution::shell_quote;
use async_trait::async_trait;

const RENEW_CRON: &str = "0 0 * * * /usr/bin/certbot renew --quiet";

/// Obtains a certificate with certbot; a no-op when SSL is skipped
#[derive(Debug, Default, Clone, Copy)]
pub struct SslStep;

#[async_trait]
impl Step for SslStep {
    fn name(&self) -> &'static str {
        "Setup SSL Certificate"
    }

    fn description(&self) -> &'static str {
        "Setting up SSL certificate"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        if ctx.config.skip_ssl {
            ctx.skipped("SSL setup disabled");
            return Ok(());
        }

        ctx.detail("Installing Certbot");
        ctx.sh("apt-get update", "Certbot installation").await?;
        ctx.sh(apt_install("certbot python3-certbot-apache"), "Certbot installation")
            .await?;

        ctx.detail(&format!(
            "Obtaining SSL certificate; follow the Certbot prompts for {}",
            ctx.config.domain
        ));
        ctx.sh(
            format!("certbot --apache -d {}", shell_quote(&ctx.config.domain)),
            "Getting SSL certificate",
        )
        .await?;

        ctx.detail("Setting up automatic renewal");
        ctx.sh(
            format!(
                "crontab -l 2>/dev/null | grep -qF 'certbot renew' || \
                 (crontab -l 2>/dev/null; echo '{}') | crontab -",
                RENEW_CRON
            ),
            "Adding renewal cron job",
        )
        .await?;

        Ok(())
    }
}
