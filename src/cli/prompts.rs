//! Interactive configuration prompts

use crate::cli::output::style;
use crate::core::config::{validate_domain, validate_smtp_port, DEFAULT_SMTP_PORT};
use crate::core::{InstallConfig, ProgressState};
use crate::error::InstallerError;
use crate::execution::ConfigCollector;
use async_trait::async_trait;
use inquire::validator::Validation;
use inquire::{Confirm, Password, PasswordDisplayMode, Text};

const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_FROM_NAME: &str = "Canvas LMS";

/// Collects configuration by prompting on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct InteractiveCollector;

impl InteractiveCollector {
    pub fn new() -> Self {
        Self
    }

    fn collect_smtp(config: &mut InstallConfig) -> Result<(), InstallerError> {
        println!("\n{}", style("SMTP Configuration (for Canvas notifications)").dim());

        config.smtp_server = Text::new("SMTP Server")
            .with_default(DEFAULT_SMTP_SERVER)
            .prompt()?
            .trim()
            .to_string();
        config.smtp_port = Text::new("SMTP Port")
            .with_default(DEFAULT_SMTP_PORT)
            .with_validator(|port: &str| {
                Ok(match validate_smtp_port(port) {
                    Ok(()) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                })
            })
            .prompt()?
            .trim()
            .to_string();
        config.smtp_username = Text::new("SMTP Username/Email").prompt()?;
        config.smtp_password = Password::new("SMTP Password")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?;
        config.smtp_from_email = Text::new("From Email Address").prompt()?;
        config.smtp_from_name = Text::new("From Name")
            .with_default(DEFAULT_FROM_NAME)
            .prompt()?;
        Ok(())
    }

    fn collect_rce_keys(config: &mut InstallConfig) -> Result<(), InstallerError> {
        println!("\n{}", style("API Keys for Rich Content Editor").dim());

        config.flickr_api_key = Text::new("Flickr API Key (optional)")
            .with_default("")
            .prompt()?;
        config.youtube_api_key = Text::new("YouTube API Key (optional)")
            .with_default("")
            .prompt()?;
        Ok(())
    }

    fn prompt_config() -> Result<InstallConfig, InstallerError> {
        println!("\n{}", style("Configuration Setup").cyan().bold());
        println!("Please provide the following information for your Canvas installation:\n");

        let mut config = InstallConfig::default();

        config.domain = Text::new("Domain name for Canvas")
            .with_placeholder("canvas.example.com")
            .with_validator(|domain: &str| {
                Ok(match validate_domain(domain) {
                    Ok(()) => Validation::Valid,
                    Err(e) => Validation::Invalid(e.to_string().into()),
                })
            })
            .prompt()?
            .trim()
            .to_string();

        config.canvas_password = Password::new("PostgreSQL password for canvas user")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_validator(|password: &str| {
                Ok(if password.is_empty() {
                    Validation::Invalid("Password must not be empty".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt()?;

        if Confirm::new("Configure email settings now?")
            .with_default(true)
            .prompt()?
        {
            Self::collect_smtp(&mut config)?;
        }

        if Confirm::new("Configure Rich Content Editor API keys?")
            .with_default(true)
            .prompt()?
        {
            Self::collect_rce_keys(&mut config)?;
        } else {
            config.skip_rce = true;
        }

        config.skip_ssl = !Confirm::new("Setup SSL certificate with Let's Encrypt?")
            .with_default(true)
            .prompt()?;
        config.skip_optimization = !Confirm::new("Enable file download optimization?")
            .with_default(true)
            .prompt()?;

        config.validate()?;
        Ok(config)
    }
}

#[async_trait]
impl ConfigCollector for InteractiveCollector {
    async fn collect(&self) -> Result<InstallConfig, InstallerError> {
        Self::prompt_config()
    }

    async fn confirm_resume(&self, prior: &ProgressState) -> Result<bool, InstallerError> {
        let question = format!(
            "Previous installation found (saved {}). Resume from step {}?",
            prior.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            prior.resume_position()
        );
        Ok(Confirm::new(&question)
            .with_default(true)
            .with_help_message("Answering no discards the saved progress and starts over")
            .prompt()?)
    }
}
