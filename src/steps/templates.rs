//! Generated configuration file contents
//!
//! Canvas YAML files are built from typed structs and serialized with
//! `serde_yaml`, so passwords and keys containing YAML metacharacters are
//! quoted correctly. Apache and dotenv files are plain text.

use crate::core::InstallConfig;
use crate::steps::{CANVAS_ROOT, RCE_PORT};
use serde::Serialize;

/// Settings keyed by Rails environment
#[derive(Serialize)]
struct Environments<P, D> {
    production: P,
    development: D,
}

#[derive(Serialize)]
struct DatabaseSettings<'a> {
    adapter: &'a str,
    encoding: &'a str,
    database: &'a str,
    pool: u32,
    username: &'a str,
    password: &'a str,
    host: &'a str,
    timeout: u32,
}

/// `config/database.yml`
pub fn database_yml(password: &str) -> Result<String, serde_yaml::Error> {
    let settings = |database: &'static str| DatabaseSettings {
        adapter: "postgresql",
        encoding: "unicode",
        database,
        pool: 5,
        username: "canvas",
        password,
        host: "localhost",
        timeout: 5000,
    };
    serde_yaml::to_string(&Environments {
        production: settings("canvas_production"),
        development: settings("canvas_development"),
    })
}

#[derive(Serialize)]
struct DynamicSettings {
    store: DynamicStore,
}

#[derive(Serialize)]
struct DynamicStore {
    canvas: CanvasStore,
}

#[derive(Serialize)]
struct CanvasStore {
    #[serde(rename = "rich-content-service")]
    rich_content_service: RichContentService,
}

#[derive(Serialize)]
struct RichContentService {
    #[serde(rename = "app-host")]
    app_host: String,
}

fn dynamic_settings(app_host: String) -> DynamicSettings {
    DynamicSettings {
        store: DynamicStore {
            canvas: CanvasStore {
                rich_content_service: RichContentService { app_host },
            },
        },
    }
}

/// `config/dynamic_settings.yml`
pub fn dynamic_settings_yml(domain: &str) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&Environments {
        production: dynamic_settings(domain.to_string()),
        development: dynamic_settings(format!("http://localhost:{}", RCE_PORT)),
    })
}

#[derive(Serialize)]
struct MailSettings<'a> {
    address: &'a str,
    port: &'a str,
    enable_starttls_auto: bool,
    ssl: bool,
    user_name: &'a str,
    password: &'a str,
    authentication: &'a str,
    domain: &'a str,
    outgoing_address: &'a str,
    default_name: &'a str,
}

#[derive(Serialize)]
struct MailDelivery<'a> {
    delivery_method: &'a str,
}

/// `config/outgoing_mail.yml`
pub fn outgoing_mail_yml(config: &InstallConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&Environments {
        production: MailSettings {
            address: &config.smtp_server,
            port: &config.smtp_port,
            enable_starttls_auto: false,
            ssl: true,
            user_name: &config.smtp_username,
            password: &config.smtp_password,
            authentication: "cram_md5",
            domain: &config.smtp_server,
            outgoing_address: &config.smtp_from_email,
            default_name: &config.smtp_from_name,
        },
        development: MailDelivery {
            delivery_method: "test",
        },
    })
}

#[derive(Serialize)]
struct DomainSettings {
    domain: String,
    ssl: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    files_domain: Option<String>,
}

/// `config/domain.yml`
pub fn domain_yml(domain: &str) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&Environments {
        production: DomainSettings {
            domain: domain.to_string(),
            ssl: true,
            files_domain: Some(format!("files-{}", domain)),
        },
        development: DomainSettings {
            domain: "canvas.localhost".to_string(),
            ssl: false,
            files_domain: None,
        },
    })
}

#[derive(Serialize, Clone)]
struct SecuritySettings<'a> {
    encryption_key: &'a str,
    lti_iss: &'a str,
}

/// `config/security.yml`; development shares the production settings
pub fn security_yml(encryption_key: &str, domain: &str) -> Result<String, serde_yaml::Error> {
    let settings = SecuritySettings {
        encryption_key,
        lti_iss: domain,
    };
    serde_yaml::to_string(&Environments {
        production: settings.clone(),
        development: settings,
    })
}

#[derive(Serialize)]
struct CacheSettings {
    cache_store: &'static str,
}

#[derive(Serialize)]
struct ThreeEnvironments<T> {
    test: T,
    development: T,
    production: T,
}

/// `config/cache_store.yml`
pub fn cache_store_yml() -> Result<String, serde_yaml::Error> {
    let redis = || CacheSettings {
        cache_store: "redis_cache_store",
    };
    serde_yaml::to_string(&ThreeEnvironments {
        test: redis(),
        development: redis(),
        production: redis(),
    })
}

#[derive(Serialize)]
struct RedisSettings {
    url: Vec<&'static str>,
}

/// `config/redis.yml`
pub fn redis_yml() -> Result<String, serde_yaml::Error> {
    let local = || RedisSettings {
        url: vec!["redis://localhost"],
    };
    serde_yaml::to_string(&ThreeEnvironments {
        test: local(),
        development: local(),
        production: local(),
    })
}

#[derive(Serialize)]
struct StsCredentials {
    access_key: &'static str,
    secret_key: &'static str,
    security_token: &'static str,
}

impl StsCredentials {
    fn placeholder() -> Self {
        Self {
            access_key: "fake-access-key",
            secret_key: "fake-secret-key",
            security_token: "fake-security-token",
        }
    }
}

#[derive(Serialize)]
struct VaultSecrets<'a> {
    data: VaultData<'a>,
}

#[derive(Serialize)]
struct VaultData<'a> {
    canvas_security: CanvasSecurity<'a>,
}

#[derive(Serialize)]
struct CanvasSecurity<'a> {
    encryption_secret: &'a str,
    signing_secret: &'a str,
}

#[derive(Serialize)]
struct VaultContents<'a> {
    #[serde(rename = "sts/testaccount/sts/canvas-shards-lookupper-dev")]
    shards_lookupper: StsCredentials,
    #[serde(rename = "sts/testaccount/sts/canvas-release-notes")]
    release_notes: StsCredentials,
    #[serde(rename = "app-canvas/data/secrets")]
    secrets: VaultSecrets<'a>,
}

#[derive(Serialize)]
struct ProductionOnly<T> {
    production: T,
}

/// `config/vault_contents.yml`, sharing the RCE API's ecosystem secrets
pub fn vault_contents_yml(
    ecosystem_key: &str,
    ecosystem_secret: &str,
) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&ProductionOnly {
        production: VaultContents {
            shards_lookupper: StsCredentials::placeholder(),
            release_notes: StsCredentials::placeholder(),
            secrets: VaultSecrets {
                data: VaultData {
                    canvas_security: CanvasSecurity {
                        encryption_secret: ecosystem_key,
                        signing_secret: ecosystem_secret,
                    },
                },
            },
        },
    })
}

fn public_directory() -> String {
    format!(
        "    <Directory {root}/public>
        AllowOverride all
        Options -MultiViews
        Require all granted
    </Directory>",
        root = CANVAS_ROOT
    )
}

/// `/etc/apache2/sites-available/canvas.conf`
pub fn http_vhost(domain: &str) -> String {
    format!(
        "<VirtualHost *:80>
    ServerName {domain}
    DocumentRoot {root}/public
    PassengerRuby /usr/bin/ruby3.3
    PassengerAppEnv production
    RailsEnv production
{directory}
</VirtualHost>
",
        root = CANVAS_ROOT,
        directory = public_directory(),
    )
}

/// `/etc/apache2/sites-available/canvas-ssl.conf`
pub fn https_vhost(domain: &str) -> String {
    format!(
        "<IfModule mod_ssl.c>
<VirtualHost *:443>
    ServerName {domain}
    DocumentRoot {root}/public
    PassengerRuby /usr/bin/ruby3.3
    PassengerAppEnv production
    RailsEnv production
    SSLEngine On
    SSLCertificateFile /etc/letsencrypt/live/{domain}/fullchain.pem
    SSLCertificateKeyFile /etc/letsencrypt/live/{domain}/privkey.pem
    Include /etc/letsencrypt/options-ssl-apache.conf
{directory}
    XSendFile On
    XSendFilePath {root}

    # Rich Content Editor API
    ProxyPass /api/session http://localhost:{rce_port}/api/session
    ProxyPassReverse /api/session http://localhost:{rce_port}/api/session
</VirtualHost>
</IfModule>
",
        root = CANVAS_ROOT,
        directory = public_directory(),
        rce_port = RCE_PORT,
    )
}

/// Passenger directives appended to `mods-available/passenger.conf`
pub const PASSENGER_DIRECTIVES: &str = "PassengerDefaultUser canvas
PassengerStartTimeout 180
PassengerPreloadBundler On
PassengerFriendlyErrorPages On";

/// Secrets the RCE API shares with Canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RceSecrets {
    pub ecosystem_secret: String,
    pub ecosystem_key: String,
    pub cipher_password: String,
}

/// `.env` for the RCE API service
pub fn rce_env(secrets: &RceSecrets, config: &InstallConfig) -> String {
    format!(
        "NODE_ENV=production
PORT={port}
ECOSYSTEM_SECRET={secret}
ECOSYSTEM_KEY={key}
CIPHER_PASSWORD={cipher}
FLICKR_API_KEY={flickr}
YOUTUBE_API_KEY={youtube}
",
        port = RCE_PORT,
        secret = secrets.ecosystem_secret,
        key = secrets.ecosystem_key,
        cipher = secrets.cipher_password,
        flickr = config.flickr_api_key,
        youtube = config.youtube_api_key,
    )
}

/// `config/environments/production-local.rb`
pub const PRODUCTION_LOCAL_RB: &str = "# X-Sendfile optimization for file downloads
config.action_dispatch.x_sendfile_header = 'X-Sendfile'
";
