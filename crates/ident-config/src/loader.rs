//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "identity.toml",
    "./config/identity.toml",
    "/etc/identity/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("IDENTITY_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `IDENTITY_*` overrides read through `lookup`.
///
/// Numeric values that fail to parse are ignored and the file value stays.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // MongoDB
    if let Some(val) = lookup("IDENTITY_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("IDENTITY_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Token
    if let Some(val) = lookup("IDENTITY_TOKEN_ISSUER") {
        config.token.issuer = val;
    }
    if let Some(val) = lookup("IDENTITY_TOKEN_SIGNING_SECRET") {
        config.token.signing_secret = val;
    }
    if let Some(val) = lookup("IDENTITY_TEMPORARY_TOKEN_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.token.temporary_token_timeout_secs = secs;
        }
    }

    // Reset password
    if let Some(val) = lookup("IDENTITY_RESET_PASSWORD_MODE") {
        config.reset_password.mode = val.parse()?;
    }
    if let Some(val) = lookup("IDENTITY_TEMPORARY_PASSWORD_LENGTH") {
        if let Ok(len) = val.parse() {
            config.reset_password.temporary_password_length = len;
        }
    }

    // Email
    if let Some(val) = lookup("IDENTITY_CONSOLE_DOMAIN") {
        config.email.console_domain = val;
    }
    if let Some(val) = lookup("IDENTITY_SMTP_HOST") {
        config.email.smtp.host = val;
    }
    if let Some(val) = lookup("IDENTITY_SMTP_PORT") {
        if let Ok(port) = val.parse() {
            config.email.smtp.port = port;
        }
    }
    if let Some(val) = lookup("IDENTITY_SMTP_USERNAME") {
        config.email.smtp.username = val;
    }
    if let Some(val) = lookup("IDENTITY_SMTP_PASSWORD") {
        config.email.smtp.password = val;
    }
    if let Some(val) = lookup("IDENTITY_SMTP_FROM") {
        config.email.smtp.from_address = val;
    }
    if let Some(val) = lookup("IDENTITY_SMTP_STARTTLS") {
        config.email.smtp.starttls = val.parse().unwrap_or(true);
    }

    // MFA
    if let Some(val) = lookup("IDENTITY_VERIFY_CODE_LENGTH") {
        if let Ok(len) = val.parse() {
            config.mfa.verify_code_length = len;
        }
    }
    if let Some(val) = lookup("IDENTITY_VERIFY_CODE_TTL_SECS") {
        if let Ok(ttl) = val.parse() {
            config.mfa.verify_code_ttl_secs = ttl;
        }
    }

    Ok(())
}
