/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables consumed at startup and the config keys they set
///
/// `DEBUG` is handled separately because of its lenient parsing.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SECRET_KEY", "auth.secret_key"),
    ("NOTIFICATION_TARGET", "notification.target"),
    ("NOTIFICATION_FAILURE_POLICY", "notification.failure_policy"),
    ("EMAIL_BACKEND", "mail.backend"),
    ("EMAIL_HOST", "mail.host"),
    ("EMAIL_HOST_USER", "mail.user"),
    ("EMAIL_HOST_PASSWORD", "mail.password"),
    ("EMAIL_PORT", "mail.port"),
    ("EMAIL_USE_TLS", "mail.use_tls"),
    ("EMAIL_TIMEOUT", "mail.timeout_secs"),
    ("DATABASE_URL", "storage.database_url"),
    ("CONTACTS_HOST", "server.host"),
    ("CONTACTS_PORT", "server.port"),
];

/// Keys whose values are enum variant names
const CASE_INSENSITIVE_KEYS: &[&str] = &["notification.failure_policy", "mail.backend"];

/// Application configuration, built once at startup and read-only afterwards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_debug")]
    pub debug: bool,

    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_mail")]
    pub mail: MailSettings,

    #[serde(default = "default_notification")]
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Signs bearer tokens
    #[serde(default)]
    pub secret_key: String,

    #[serde(default = "default_access_token_hours")]
    pub access_token_hours: u64,

    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Deliver through an SMTP relay
    Smtp,
    /// Print messages to the log and stdout
    Console,
    /// Keep messages in process memory
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailSettings {
    #[serde(default = "default_mail_backend")]
    pub backend: MailBackend,

    #[serde(default)]
    pub host: String,

    #[serde(default = "default_mail_port")]
    pub port: u16,

    /// SMTP account; also the sender address of notifications
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Upgrade the connection with STARTTLS
    #[serde(default)]
    pub use_tls: bool,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl MailSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// What destroy does when the deletion notification cannot be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFailurePolicy {
    /// Keep the record and fail the request
    #[default]
    Abort,
    /// Log the failure and delete anyway
    Proceed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    /// Recipient of deletion notifications
    #[serde(default)]
    pub target: String,

    #[serde(default)]
    pub failure_policy: NotificationFailurePolicy,
}

impl ServerConfig {
    /// Load configuration from `.env`, a config file and the process environment
    ///
    /// Without an explicit `path`, `config.toml` in the working directory is
    /// used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(env_file) => tracing::debug!("Loaded environment from {}", env_file.display()),
            Err(e) => tracing::debug!("No .env file loaded: {}", e),
        }

        Self::from_sources(path, |name| std::env::var(name).ok())
    }

    /// Build configuration from an optional file and an environment lookup
    pub fn from_sources<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        for &(var, key) in ENV_OVERRIDES {
            let value = env(var).map(|v| {
                if CASE_INSENSITIVE_KEYS.contains(&key) {
                    v.to_ascii_lowercase()
                } else {
                    v
                }
            });
            settings = settings
                .set_override_option(key, value)
                .map_err(|e| ServerError::Config(e.to_string()))?;
        }

        settings = settings
            .set_override_option("debug", env("DEBUG").map(|v| parse_debug_flag(&v)))
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            return Err(ServerError::Config(
                "Secret key is required (set SECRET_KEY)".to_string(),
            ));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ServerError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }

        if self.notification.target.is_empty() {
            return Err(ServerError::Config(
                "Notification target is required (set NOTIFICATION_TARGET)".to_string(),
            ));
        }

        if self.mail.backend == MailBackend::Smtp {
            if self.mail.host.is_empty() {
                return Err(ServerError::Config(
                    "SMTP backend requires a mail host (set EMAIL_HOST)".to_string(),
                ));
            }
            if self.mail.user.is_empty() {
                return Err(ServerError::Config(
                    "SMTP backend requires a mail user (set EMAIL_HOST_USER)".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "contacts_server=debug,contacts_storage=debug,tower_http=debug"
        } else {
            "contacts_server=info,tower_http=info"
        }
    }
}

/// Debug stays on unless explicitly switched off
fn parse_debug_flag(value: &str) -> bool {
    !matches!(value.trim(), "False" | "false" | "0")
}

// Default values
fn default_debug() -> bool {
    true
}

fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/contacts.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        secret_key: String::new(),
        access_token_hours: default_access_token_hours(),
        refresh_token_days: default_refresh_token_days(),
        bcrypt_cost: default_bcrypt_cost(),
    }
}

fn default_access_token_hours() -> u64 {
    24
}

fn default_refresh_token_days() -> u64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_mail() -> MailSettings {
    MailSettings {
        backend: default_mail_backend(),
        host: String::new(),
        port: default_mail_port(),
        user: String::new(),
        password: String::new(),
        use_tls: false,
        timeout_secs: None,
    }
}

fn default_mail_backend() -> MailBackend {
    MailBackend::Smtp
}

fn default_mail_port() -> u16 {
    25
}

fn default_notification() -> NotificationSettings {
    NotificationSettings {
        target: String::new(),
        failure_policy: NotificationFailurePolicy::default(),
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debug: default_debug(),
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            mail: default_mail(),
            notification: default_notification(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    /// Keeps tests independent of a `config.toml` in the working directory
    fn empty_config_file() -> tempfile::NamedTempFile {
        tempfile::Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn environment_names_populate_config() {
        let file = empty_config_file();
        let config = ServerConfig::from_sources(
            Some(file.path()),
            env(&[
                ("DEBUG", "False"),
                ("SECRET_KEY", "s3cret"),
                ("NOTIFICATION_TARGET", "ops@example.com"),
                ("EMAIL_BACKEND", "SMTP"),
                ("EMAIL_HOST", "smtp.example.com"),
                ("EMAIL_HOST_USER", "robot@example.com"),
                ("EMAIL_HOST_PASSWORD", "pw"),
                ("EMAIL_PORT", "587"),
                ("EMAIL_USE_TLS", "True"),
            ]),
        )
        .unwrap();

        assert!(!config.debug);
        assert_eq!(config.auth.secret_key, "s3cret");
        assert_eq!(config.notification.target, "ops@example.com");
        assert_eq!(config.mail.backend, MailBackend::Smtp);
        assert_eq!(config.mail.host, "smtp.example.com");
        assert_eq!(config.mail.user, "robot@example.com");
        assert_eq!(config.mail.password, "pw");
        assert_eq!(config.mail.port, 587);
        assert!(config.mail.use_tls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_flag_is_lenient() {
        assert!(!parse_debug_flag("False"));
        assert!(!parse_debug_flag("0"));
        assert!(parse_debug_flag("True"));
        assert!(parse_debug_flag("anything"));
    }

    #[test]
    fn defaults_apply_without_environment() {
        let file = empty_config_file();
        let config = ServerConfig::from_sources(Some(file.path()), env(&[])).unwrap();

        assert!(config.debug);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.mail.backend, MailBackend::Smtp);
        assert_eq!(
            config.notification.failure_policy,
            NotificationFailurePolicy::Abort
        );
    }

    #[test]
    fn failure_policy_from_environment() {
        let file = empty_config_file();
        let config = ServerConfig::from_sources(
            Some(file.path()),
            env(&[("NOTIFICATION_FAILURE_POLICY", "Proceed")]),
        )
        .unwrap();

        assert_eq!(
            config.notification.failure_policy,
            NotificationFailurePolicy::Proceed
        );
    }

    #[test]
    fn validate_requires_secret_and_target() {
        let mut config = ServerConfig::default();
        config.mail.backend = MailBackend::Console;
        assert!(config.validate().is_err());

        config.auth.secret_key = "k".to_string();
        assert!(config.validate().is_err());

        config.notification.target = "ops@example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_requires_smtp_host() {
        let mut config = ServerConfig::default();
        config.auth.secret_key = "k".to_string();
        config.notification.target = "ops@example.com".to_string();
        config.mail.user = "robot@example.com".to_string();

        assert!(config.validate().is_err());

        config.mail.host = "smtp.example.com".to_string();
        assert!(config.validate().is_ok());
    }
}
