//! Step 6: database, mail, domain and security settings

use super::secrets::token_hex;
use super::templates;
use super::{canvas_config_path, rendered, CANVAS_USER};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigureCanvasStep;

impl ConfigureCanvasStep {
    async fn write(ctx: &StepContext<'_>, file: &str, contents: &str) -> Result<(), StepError> {
        ctx.write_file(canvas_config_path(file), contents, Some(CANVAS_USER))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Step for ConfigureCanvasStep {
    fn name(&self) -> &'static str {
        "Configure Database, Mail & Domain"
    }

    fn description(&self) -> &'static str {
        "Writing Canvas configuration files"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let config = ctx.config;

        ctx.detail("Configuring database settings");
        let database = rendered(
            "database.yml",
            templates::database_yml(&config.canvas_password),
        )?;
        Self::write(ctx, "database.yml", &database).await?;

        ctx.detail("Configuring dynamic settings");
        let dynamic = rendered(
            "dynamic_settings.yml",
            templates::dynamic_settings_yml(&config.domain),
        )?;
        Self::write(ctx, "dynamic_settings.yml", &dynamic).await?;

        if config.has_smtp() {
            ctx.detail("Configuring email settings");
            let mail = rendered("outgoing_mail.yml", templates::outgoing_mail_yml(config))?;
            Self::write(ctx, "outgoing_mail.yml", &mail).await?;
        } else {
            ctx.detail("No SMTP server configured; leaving outgoing_mail.yml as is");
        }

        ctx.detail("Configuring domain settings");
        let domain = rendered("domain.yml", templates::domain_yml(&config.domain))?;
        Self::write(ctx, "domain.yml", &domain).await?;

        // Fresh key on every run; nothing is encrypted with it before step 7.
        ctx.detail("Configuring security settings");
        let security = rendered(
            "security.yml",
            templates::security_yml(&token_hex(32), &config.domain),
        )?;
        Self::write(ctx, "security.yml", &security).await?;

        Ok(())
    }
}
