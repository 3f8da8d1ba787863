//! The Canvas LMS installation steps
//!
//! Fourteen steps, always in this order. Positions are persisted as resume
//! points, so new steps go at the end or the state file format changes.

pub mod apache;
pub mod assets;
pub mod canvas_config;
pub mod canvas_source;
pub mod canvas_user;
pub mod jobs_firewall;
pub mod permissions;
pub mod postgres;
pub mod rce;
pub mod redis;
pub mod secrets;
pub mod ssl;
pub mod system_check;
pub mod templates;
pub mod toolchain;
pub mod vhosts;

pub use apache::ApacheStep;
pub use assets::CompileAssetsStep;
pub use canvas_config::ConfigureCanvasStep;
pub use canvas_source::CloneCanvasStep;
pub use canvas_user::CanvasUserStep;
pub use jobs_firewall::JobsFirewallStep;
pub use permissions::FinalizeStep;
pub use postgres::PostgresStep;
pub use rce::RichContentEditorStep;
pub use redis::RedisStep;
pub use ssl::SslStep;
pub use system_check::SystemPrerequisitesStep;
pub use toolchain::ToolchainStep;
pub use vhosts::VirtualHostsStep;

use crate::core::{InstallConfig, Pipeline, PipelineError, StepError};

/// System account Canvas runs as
pub const CANVAS_USER: &str = "canvas";

/// Canvas checkout
pub const CANVAS_ROOT: &str = "/var/canvas";

/// Rich Content Editor API checkout
pub const RCE_ROOT: &str = "/var/canvas-rce-api";

/// Port the RCE API listens on
pub const RCE_PORT: u16 = 3001;

/// Shell prefix that puts NVM's node and yarn on PATH
pub(crate) const NVM_ENV: &str = r#"export NVM_DIR="$HOME/.nvm"; [ -s "$NVM_DIR/nvm.sh" ] && . "$NVM_DIR/nvm.sh"; export PATH="$HOME/.yarn/bin:$HOME/.config/yarn/global/node_modules/.bin:$PATH""#;

/// Path of a file under the Canvas config directory
pub(crate) fn canvas_config_path(file: &str) -> String {
    format!("{}/config/{}", CANVAS_ROOT, file)
}

/// Non-interactive apt install line
pub(crate) fn apt_install(packages: &str) -> String {
    format!("DEBIAN_FRONTEND=noninteractive apt-get install -y {}", packages)
}

/// Attach the file name to a YAML rendering failure
pub(crate) fn rendered(
    file: &str,
    result: Result<String, serde_yaml::Error>,
) -> Result<String, StepError> {
    result.map_err(|source| StepError::Template {
        file: file.to_string(),
        source,
    })
}

/// Build the full installation pipeline
pub fn canvas_pipeline() -> Result<Pipeline, PipelineError> {
    let pipeline = Pipeline::new(
        "canvas-lms",
        vec![
            Box::new(SystemPrerequisitesStep),
            Box::new(CanvasUserStep),
            Box::new(PostgresStep),
            Box::new(ToolchainStep),
            Box::new(CloneCanvasStep),
            Box::new(ConfigureCanvasStep),
            Box::new(CompileAssetsStep),
            Box::new(ApacheStep),
            Box::new(SslStep),
            Box::new(VirtualHostsStep),
            Box::new(JobsFirewallStep),
            Box::new(RedisStep),
            Box::new(RichContentEditorStep),
            Box::new(FinalizeStep),
        ],
    )?;
    Ok(pipeline.with_completion_message(completion_message))
}

fn completion_message(config: &InstallConfig) -> String {
    let scheme = if config.skip_ssl { "http" } else { "https" };
    let mut message = format!(
        "Your Canvas instance is available at: {}://{}\n\nNext steps:\n\
         1. Access your Canvas installation via the domain above\n\
         2. Complete the initial Canvas setup wizard",
        scheme, config.domain
    );
    if !config.skip_rce {
        message.push_str(&format!(
            "\n3. Start the Rich Content Editor API with: cd {} && screen -S canvas-rce-api npm start",
            RCE_ROOT
        ));
    }
    message
}
