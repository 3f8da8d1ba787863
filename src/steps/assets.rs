//! Step 7: gems, node packages, database setup and asset compilation

use super::{CANVAS_ROOT, CANVAS_USER, NVM_ENV};
use crate::core::{Step, StepContext, StepError};
use async_trait::async_trait;

/// Long-running dependency and build commands
const BUILD_TIMEOUT_SECS: u64 = 3600;

/// Written once `db:initial_setup` has completed
pub const DB_INITIALIZED_MARKER: &str = "/var/canvas/tmp/.installer_db_initialized";

#[derive(Debug, Default, Clone, Copy)]
pub struct CompileAssetsStep;

#[async_trait]
impl Step for CompileAssetsStep {
    fn name(&self) -> &'static str {
        "Install Dependencies & Compile Assets"
    }

    fn description(&self) -> &'static str {
        "Installing dependencies and compiling assets"
    }

    async fn run(&self, ctx: &StepContext<'_>) -> Result<(), StepError> {
        ctx.detail("Installing bundler");
        ctx.sh("gem install bundler --no-document", "Installing bundler")
            .await?;

        ctx.detail("Installing Ruby gems");
        ctx.run(
            ctx.command(format!(
                "cd {} && bundle config set --local path vendor/bundle && bundle install",
                CANVAS_ROOT
            ))
            .describe("Installing Ruby gems")
            .timeout_secs(BUILD_TIMEOUT_SECS),
        )
        .await?;

        ctx.detail("Installing Node packages");
        ctx.run(
            ctx.command(format!("cd {} && {} && yarn install", CANVAS_ROOT, NVM_ENV))
                .describe("Installing Node packages")
                .timeout_secs(BUILD_TIMEOUT_SECS),
        )
        .await?;

        if ctx.probe(&format!("test -f {}", DB_INITIALIZED_MARKER)).await {
            ctx.detail("Database already initialized");
        } else {
            // Prompts for the admin account, so it shares the terminal.
            ctx.detail("Initializing the Canvas database");
            ctx.run(
                ctx.command(format!(
                    "cd {} && RAILS_ENV=production bundle exec rake db:initial_setup",
                    CANVAS_ROOT
                ))
                .describe("Initializing the Canvas database")
                .timeout_secs(BUILD_TIMEOUT_SECS),
            )
            .await?;
            ctx.sh(
                format!("mkdir -p {root}/tmp && touch {}", DB_INITIALIZED_MARKER, root = CANVAS_ROOT),
                "Recording database initialization",
            )
            .await?;
        }

        ctx.detail("Compiling assets");
        ctx.run(
            ctx.command(format!(
                "cd {root} && mkdir -p log tmp/pids public/assets app/stylesheets/brandable_css_brands && \
                 touch app/stylesheets/_brandable_variables_defaults_autogenerated.scss log/production.log && \
                 {nvm} && RAILS_ENV=production bundle exec rake canvas:compile_assets",
                root = CANVAS_ROOT,
                nvm = NVM_ENV
            ))
            .describe("Compiling assets")
            .timeout_secs(BUILD_TIMEOUT_SECS),
        )
        .await?;

        ctx.sh(
            format!("chown -R {user}:{user} {root}", user = CANVAS_USER, root = CANVAS_ROOT),
            "Restoring Canvas ownership",
        )
        .await?;

        Ok(())
    }
}
