//! Step 4: Git, Ruby, Node.js (via NVM) and Yarn

use super::{apt_install, NVM_ENV};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

const NODE_VERSION: &str = "18.20";
const YARN_VERSION: &str = "1.19.1";
const NVM_INSTALLER: &str = "https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.0/install.sh";

/// Lines added to `~/.bashrc` so later shells find node and yarn
const BASHRC_ENV: &str = r#"export NVM_DIR="$HOME/.nvm"
[ -s "$NVM_DIR/nvm.sh" ] && . "$NVM_DIR/nvm.sh"
export PATH="$HOME/.yarn/bin:$HOME/.config/yarn/global/node_modules/.bin:$PATH""#;

#[derive(Debug, Default, Clone, Copy)]
pub struct ToolchainStep;

#[async_trait]
impl Step for ToolchainStep {
    fn name(&self) -> &'static str {
        "Install Git, Ruby, Node.js & Yarn"
    }

    fn description(&self) -> &'static str {
        "Installing development tools"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        let packages = [
            (apt_install("git-core"), "Installing Git"),
            (
                apt_install("software-properties-common"),
                "Installing software properties",
            ),
            (
                "add-apt-repository -y ppa:instructure/ruby".to_string(),
                "Adding Ruby PPA",
            ),
            ("apt-get update".to_string(), "Updating package lists"),
            (
                apt_install(
                    "ruby3.3 ruby3.3-dev zlib1g-dev libxml2-dev libsqlite3-dev postgresql \
                     libpq-dev libxmlsec1-dev libidn11-dev curl make g++",
                ),
                "Installing Ruby and dependencies",
            ),
        ];
        for (command, description) in packages {
            ctx.detail(description);
            ctx.sh(command, description).await?;
        }

        ctx.detail("Installing NVM and Node.js");
        ctx.sh(
            format!(
                "set -o pipefail; curl -o- {NVM_INSTALLER} | bash && {NVM_ENV} && \
                 nvm install {NODE_VERSION} && nvm use {NODE_VERSION} && node --version && npm --version"
            ),
            "Installing NVM and Node.js",
        )
        .await?;

        ctx.detail("Installing Yarn");
        ctx.sh(
            format!(
                "set -o pipefail; rm -rf \"$HOME/.yarn\" && {NVM_ENV} && nvm use {NODE_VERSION} && \
                 curl -o- -L https://yarnpkg.com/install.sh | bash -s -- --version {YARN_VERSION} && \
                 yarn --version"
            ),
            "Installing Yarn",
        )
        .await?;

        ctx.detail("Setting up shell environment");
        ctx.sh(
            format!(
                "grep -qF 'export NVM_DIR=\"$HOME/.nvm\"' ~/.bashrc 2>/dev/null || cat >> ~/.bashrc <<'EOF'\n{BASHRC_ENV}\nEOF"
            ),
            "Setting up environment",
        )
        .await?;

        Ok(())
    }
}
