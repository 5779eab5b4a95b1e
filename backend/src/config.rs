use lettre::message::Mailbox;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    pub port: u16,
    pub frontend_dir: String,
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    // Credentials never come from the config file.
    #[serde(skip)]
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub from: String,
    pub subject: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            frontend_dir: default_frontend_dir(),
            smtp: SmtpConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            timeout_secs: 30,
            username: None,
            password: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            subject: "Your Leukemia Screening Report".to_string(),
        }
    }
}

fn default_frontend_dir() -> String {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    }
}

fn default_config_path() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => Path::new(&manifest_dir).join("../config/mailer.yaml"),
        Err(_) => PathBuf::from("config/mailer.yaml"),
    }
}

impl MailerConfig {
    /// Reads the optional YAML file named by `MAILER_CONFIG`, then applies
    /// environment overrides and secrets.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MAILER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());

        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_yaml(&std::fs::read_to_string(&path)?)?
        } else {
            log::warn!("No config file at {}, using defaults and environment", path.display());
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = lookup("SMTP_PORT") {
            self.smtp.port = parse_port("SMTP_PORT", &port)?;
        }
        if let Some(from) = lookup("MAIL_FROM") {
            self.mail.from = from;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_port("PORT", &port)?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.frontend_dir = dir;
        }
        self.smtp.username = lookup("SMTP_USERNAME").filter(|v| !v.is_empty());
        self.smtp.password = lookup("SMTP_PASSWORD").filter(|v| !v.is_empty());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.host.trim().is_empty() {
            return Err(ConfigError::Missing("SMTP_HOST"));
        }
        if self.mail.from.trim().is_empty() {
            return Err(ConfigError::Missing("MAIL_FROM"));
        }
        self.sender()?;
        if self.smtp.username.is_some() != self.smtp.password.is_some() {
            return Err(ConfigError::Invalid {
                key: "SMTP_USERNAME",
                message: "SMTP_USERNAME and SMTP_PASSWORD must be set together".into(),
            });
        }
        Ok(())
    }

    pub fn sender(&self) -> Result<Mailbox, ConfigError> {
        self.mail.from.parse().map_err(|e: lettre::address::AddressError| ConfigError::Invalid {
            key: "MAIL_FROM",
            message: e.to_string(),
        })
    }
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        message: format!("{:?} is not a port number", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const YAML: &str = r#"
port: 9000
smtp:
  host: smtp.example.com
  port: 2525
mail:
  from: "Screening <reports@example.com>"
"#;

    #[test]
    fn yaml_values_with_defaults() {
        let config = MailerConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.timeout_secs, 30);
        assert_eq!(config.mail.subject, "Your Leukemia Screening Report");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn credentials_in_yaml_are_ignored() {
        let yaml = "smtp:\n  host: smtp.example.com\n  username: leaked\n  password: leaked\n";
        let config = MailerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert!(config.smtp.username.is_none());
        assert!(config.smtp.password.is_none());
    }

    #[test]
    fn environment_overrides_file_and_supplies_secrets() {
        let mut config = MailerConfig::from_yaml(YAML).unwrap();
        config
            .apply_env(env(&[
                ("SMTP_HOST", "relay.internal"),
                ("PORT", "8085"),
                ("SMTP_USERNAME", "mailer"),
                ("SMTP_PASSWORD", "s3cret"),
            ]))
            .unwrap();

        assert_eq!(config.smtp.host, "relay.internal");
        assert_eq!(config.port, 8085);
        assert_eq!(config.smtp.username.as_deref(), Some("mailer"));
        assert_eq!(config.smtp.password.as_deref(), Some("s3cret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = MailerConfig::default();
        let err = config.apply_env(env(&[("SMTP_PORT", "smtp")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SMTP_PORT", .. }));
    }

    #[test]
    fn missing_host_or_sender_fails_validation() {
        let mut config = MailerConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("SMTP_HOST"))));

        config.smtp.host = "smtp.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("MAIL_FROM"))));

        config.mail.from = "not an address".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { key: "MAIL_FROM", .. })));
    }

    #[test]
    fn half_configured_credentials_are_rejected() {
        let mut config = MailerConfig::from_yaml(YAML).unwrap();
        config.apply_env(env(&[("SMTP_USERNAME", "mailer")])).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { key: "SMTP_USERNAME", .. })));
    }
}
