//! Installation configuration collected before the pipeline runs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Default SMTP port (implicit TLS)
pub const DEFAULT_SMTP_PORT: &str = "465";

/// Every user-supplied parameter the installation steps read.
///
/// Populated once (interactively or restored from a saved run) and then only
/// read. Secrets generated by individual steps are written into the files
/// those steps produce and never stored back here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Public domain Canvas is served from (e.g. canvas.example.com)
    pub domain: String,

    /// Password for the `canvas` PostgreSQL role
    pub canvas_password: String,

    /// SMTP relay host; empty means mail is not configured
    pub smtp_server: String,

    /// SMTP relay port, kept as text the way it lands in outgoing_mail.yml
    pub smtp_port: String,

    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_email: String,
    pub smtp_from_name: String,

    /// Optional Rich Content Editor API keys
    pub flickr_api_key: String,
    pub youtube_api_key: String,

    /// Skip Let's Encrypt certificate setup
    pub skip_ssl: bool,

    /// Skip the Rich Content Editor API service
    pub skip_rce: bool,

    /// Skip the X-Sendfile download optimization
    pub skip_optimization: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            canvas_password: String::new(),
            smtp_server: String::new(),
            smtp_port: DEFAULT_SMTP_PORT.to_string(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from_email: String::new(),
            smtp_from_name: String::new(),
            flickr_api_key: String::new(),
            youtube_api_key: String::new(),
            skip_ssl: false,
            skip_rce: false,
            skip_optimization: false,
        }
    }
}

/// Problems found by [`InstallConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("domain must not be empty")]
    EmptyDomain,

    #[error("'{0}' is not a valid host name")]
    InvalidDomain(String),

    #[error("database password must not be empty")]
    EmptyPassword,

    #[error("SMTP port '{0}' is not a number between 1 and 65535")]
    InvalidSmtpPort(String),
}

fn hostname_regex() -> &'static Regex {
    static HOSTNAME: OnceLock<Regex> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        Regex::new(r"^(?i)[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)+$")
            .expect("hostname pattern is a valid regex")
    })
}

/// Check that a domain looks like a fully qualified host name
pub fn validate_domain(domain: &str) -> Result<(), ConfigValidationError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ConfigValidationError::EmptyDomain);
    }
    if domain.len() > 253 || !hostname_regex().is_match(domain) {
        return Err(ConfigValidationError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}

/// Check that an SMTP port parses as a TCP port
pub fn validate_smtp_port(port: &str) -> Result<(), ConfigValidationError> {
    match port.trim().parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(ConfigValidationError::InvalidSmtpPort(port.to_string())),
    }
}

impl InstallConfig {
    /// Whether outgoing mail should be configured
    pub fn has_smtp(&self) -> bool {
        !self.smtp_server.trim().is_empty()
    }

    /// Validate the fields every run depends on
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_domain(&self.domain)?;
        if self.canvas_password.is_empty() {
            return Err(ConfigValidationError::EmptyPassword);
        }
        if self.has_smtp() {
            validate_smtp_port(&self.smtp_port)?;
        }
        Ok(())
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

// Secrets stay out of log output.
impl fmt::Debug for InstallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallConfig")
            .field("domain", &self.domain)
            .field("canvas_password", &redact(&self.canvas_password))
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &redact(&self.smtp_password))
            .field("smtp_from_email", &self.smtp_from_email)
            .field("smtp_from_name", &self.smtp_from_name)
            .field("flickr_api_key", &redact(&self.flickr_api_key))
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("skip_ssl", &self.skip_ssl)
            .field("skip_rce", &self.skip_rce)
            .field("skip_optimization", &self.skip_optimization)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> InstallConfig {
        InstallConfig {
            domain: "canvas.example.com".to_string(),
            canvas_password: "s3cret".to_string(),
            ..InstallConfig::default()
        }
    }

    #[test]
    fn test_default_smtp_port() {
        let config = InstallConfig::default();
        assert_eq!(config.smtp_port, "465");
        assert!(!config.has_smtp());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: InstallConfig =
            serde_json::from_str(r#"{"domain": "canvas.example.com", "skip_ssl": true}"#).unwrap();
        assert_eq!(config.domain, "canvas.example.com");
        assert!(config.skip_ssl);
        assert!(!config.skip_rce);
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_validate_accepts_fqdn() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_domains() {
        assert_eq!(validate_domain("  "), Err(ConfigValidationError::EmptyDomain));
        assert!(matches!(
            validate_domain("localhost"),
            Err(ConfigValidationError::InvalidDomain(_))
        ));
        assert!(matches!(
            validate_domain("https://canvas.example.com"),
            Err(ConfigValidationError::InvalidDomain(_))
        ));
        assert!(matches!(
            validate_domain("-bad.example.com"),
            Err(ConfigValidationError::InvalidDomain(_))
        ));
    }

    #[test]
    fn test_validate_requires_password() {
        let config = InstallConfig {
            canvas_password: String::new(),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyPassword));
    }

    #[test]
    fn test_validate_smtp_port_only_when_smtp_configured() {
        let mut config = valid_config();
        config.smtp_port = "not-a-port".to_string();
        assert!(config.validate().is_ok());

        config.smtp_server = "smtp.example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidSmtpPort(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = valid_config();
        config.smtp_password = "mailpass".to_string();
        config.youtube_api_key = "yt-key".to_string();

        let debug = format!("{:?}", config);
        assert!(debug.contains("canvas.example.com"));
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("mailpass"));
        assert!(!debug.contains("yt-key"));
        assert!(debug.contains("<redacted>"));
    }
}
