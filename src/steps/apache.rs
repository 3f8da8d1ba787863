//! Step 8: Apache with Passenger

use super::apt_install;
use super::templates::PASSENGER_DIRECTIVES;
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

const PASSENGER_CONF: &str = "/etc/apache2/mods-available/passenger.conf";
const MODULES: [&str; 4] = ["rewrite", "passenger", "ssl", "proxy_http"];

#[derive(Debug, Default, Clone, Copy)]
pub struct ApacheStep;

#[async_trait]
impl Step for ApacheStep {
    fn name(&self) -> &'static str {
        "Install & Configure Apache"
    }

    fn description(&self) -> &'static str {
        "Installing Apache and Passenger"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Installing Apache");
        let install = [
            apt_install("apache2"),
            apt_install("dirmngr gnupg apt-transport-https ca-certificates"),
            "apt-key adv --keyserver hkp://keyserver.ubuntu.com:80 --recv-keys 561F9B9CAC40B2F7"
                .to_string(),
            "echo deb https://oss-binaries.phusionpassenger.com/apt/passenger $(lsb_release -cs) main > /etc/apt/sources.list.d/passenger.list"
                .to_string(),
            "apt-get update".to_string(),
            apt_install("libapache2-mod-passenger"),
        ];
        for command in install {
            ctx.sh(command, "Apache installation").await?;
        }

        ctx.detail("Configuring Apache modules");
        for module in MODULES {
            ctx.sh(format!("a2enmod {}", module), format!("Enabling {} module", module))
                .await?;
        }

        ctx.detail("Configuring Passenger");
        ctx.sh(
            format!(
                "grep -q '^PassengerDefaultUser' {conf} 2>/dev/null || cat >> {conf} <<'EOF'\n{directives}\nEOF",
                conf = PASSENGER_CONF,
                directives = PASSENGER_DIRECTIVES
            ),
            "Adding Passenger configuration",
        )
        .await?;

        ctx.sh("systemctl restart apache2", "Restarting Apache").await?;
        Ok(())
    }
}
