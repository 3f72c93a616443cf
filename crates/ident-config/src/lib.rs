//! Identity Configuration
//!
//! TOML-based configuration with environment variable overrides. Components
//! receive the section they need as an explicit value; nothing in the
//! platform reads process state on its own.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mongodb: MongoConfig,
    pub token: TokenConfig,
    pub reset_password: ResetPasswordConfig,
    pub email: EmailConfig,
    pub mfa: MfaConfig,
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true".to_string(),
            database: "identity".to_string(),
        }
    }
}

/// Temporary token issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub issuer: String,
    pub signing_secret: String,
    pub temporary_token_timeout_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "identity".to_string(),
            signing_secret: String::new(),
            temporary_token_timeout_secs: 86400,
        }
    }
}

/// How a forgotten password is recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetPasswordMode {
    /// Email a console link carrying a temporary access token
    AccessToken,
    /// Email a generated temporary password
    Password,
}

impl std::str::FromStr for ResetPasswordMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACCESS_TOKEN" => Ok(Self::AccessToken),
            "PASSWORD" => Ok(Self::Password),
            other => Err(ConfigError::ValidationError(format!(
                "unknown reset password mode '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetPasswordConfig {
    pub mode: ResetPasswordMode,
    pub temporary_password_length: usize,
}

impl Default for ResetPasswordConfig {
    fn default() -> Self {
        Self {
            mode: ResetPasswordMode::AccessToken,
            temporary_password_length: 12,
        }
    }
}

/// Outbound email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Console URL template; `{domain_name}` is replaced per domain
    pub console_domain: String,
    pub smtp: SmtpConfig,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            console_domain: "https://{domain_name}.console.example.com".to_string(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl EmailConfig {
    /// Console URL for a domain.
    pub fn console_url(&self, domain_name: &str) -> String {
        self.console_domain.replace("{domain_name}", domain_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_address: "no-reply@example.com".to_string(),
            starttls: true,
        }
    }
}

/// Verification code settings for MFA and email confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MfaConfig {
    pub verify_code_length: usize,
    pub verify_code_ttl_secs: u64,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            verify_code_length: 6,
            verify_code_ttl_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the platform cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mfa.verify_code_length == 0 {
            return Err(ConfigError::ValidationError(
                "mfa.verify_code_length must be greater than zero".to_string(),
            ));
        }
        if self.reset_password.temporary_password_length < 3 {
            return Err(ConfigError::ValidationError(
                "reset_password.temporary_password_length must be at least 3".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Identity Configuration
# Environment variables (IDENTITY_*) override these settings

[mongodb]
uri = "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true"
database = "identity"

[token]
issuer = "identity"
signing_secret = ""
temporary_token_timeout_secs = 86400

[reset_password]
mode = "ACCESS_TOKEN"  # ACCESS_TOKEN or PASSWORD
temporary_password_length = 12

[email]
console_domain = "https://{domain_name}.console.example.com"

[email.smtp]
host = "localhost"
port = 587
username = ""
password = ""
from_address = "no-reply@example.com"
starttls = true

[mfa]
verify_code_length = 6
verify_code_ttl_secs = 300
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.mongodb.database, "identity");
        assert_eq!(config.reset_password.mode, ResetPasswordMode::AccessToken);
        assert_eq!(config.mfa.verify_code_length, 6);
        assert_eq!(config.token.temporary_token_timeout_secs, 86400);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reset_password]\nmode = \"PASSWORD\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.reset_password.mode, ResetPasswordMode::Password);
        assert_eq!(config.reset_password.temporary_password_length, 12);
        assert_eq!(config.mongodb.database, "identity");
    }

    #[test]
    fn test_validation_rejects_zero_code_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mfa]\nverify_code_length = 0").unwrap();

        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_console_url() {
        let email = EmailConfig::default();
        assert_eq!(
            email.console_url("acme"),
            "https://acme.console.example.com"
        );
    }

    #[test]
    fn test_reset_password_mode_from_str() {
        assert_eq!("password".parse::<ResetPasswordMode>().unwrap(), ResetPasswordMode::Password);
        assert_eq!("ACCESS_TOKEN".parse::<ResetPasswordMode>().unwrap(), ResetPasswordMode::AccessToken);
        assert!("magic-link".parse::<ResetPasswordMode>().is_err());
    }
}
