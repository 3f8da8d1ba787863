//! Step 11: background job service and firewall rules

use super::CANVAS_ROOT;
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

/// Ports opened in ufw, with a label for progress output
pub const FIREWALL_PORTS: [(&str, &str); 8] = [
    ("80", "HTTP"),
    ("443", "HTTPS"),
    ("5432", "PostgreSQL"),
    ("3000", "Canvas Dev"),
    ("3001", "RCE API"),
    ("6379", "Redis"),
    ("8000", "Alternative HTTP"),
    ("ssh", "SSH"),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct JobsFirewallStep;

#[async_trait]
impl Step for JobsFirewallStep {
    fn name(&self) -> &'static str {
        "Setup Jobs & Firewall"
    }

    fn description(&self) -> &'static str {
        "Setting up background jobs and firewall"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Setting up Canvas init script");
        let init = [
            format!("ln -sf {}/script/canvas_init /etc/init.d/canvas_init", CANVAS_ROOT),
            "update-rc.d canvas_init defaults".to_string(),
            "/etc/init.d/canvas_init start".to_string(),
        ];
        for command in init {
            ctx.sh(command, "Canvas init setup").await?;
        }

        ctx.detail("Configuring firewall rules");
        for (port, label) in FIREWALL_PORTS {
            ctx.sh(format!("ufw allow {}", port), format!("Allowing {}", label))
                .await?;
        }
        ctx.sh("ufw --force enable", "Enabling firewall").await?;
        ctx.sh("ufw reload", "Reloading firewall").await?;

        Ok(())
    }
}
