//! Configuration management for undertaker.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::DateStyle;
use crate::session::Session;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "undertaker";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "wills.db";

/// Placeholder credential values shipped in the defaults.
const PLACEHOLDER_SERVICE_ID: &str = "YOUR_SERVICE_ID";
const PLACEHOLDER_TEMPLATE_ID: &str = "YOUR_TEMPLATE_ID";
const PLACEHOLDER_USER_ID: &str = "YOUR_USER_ID";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `UNDERTAKER_`, sections split by `__`)
/// 2. TOML config file at `~/.config/undertaker/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Signed-in identity.
    pub session: SessionConfig,
    /// Email provider configuration.
    pub email: EmailConfig,
    /// PDF export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/undertaker/wills.db`
    pub database_path: Option<PathBuf>,
}

/// The identity the CLI acts as when no `--user` flag is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Opaque user identifier from the authentication provider.
    pub uid: Option<String>,
    /// Email address of the signed-in user.
    pub email: Option<String>,
    /// Display name of the signed-in user.
    pub display_name: Option<String>,
}

/// Transactional email provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Send endpoint of the provider's REST API.
    pub endpoint: String,
    /// Provider service id.
    pub service_id: String,
    /// Provider template id.
    pub template_id: String,
    /// Provider account (public key) id.
    pub user_id: String,
    /// Private access token, required when the account enforces it.
    pub access_token: Option<String>,
    /// Sender label put into the template.
    pub from_name: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// PDF export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used when downloading without an explicit path.
    pub file_name: String,
    /// JPEG quality of the embedded raster (1-100).
    pub jpeg_quality: u8,
    /// How dates are formatted in the preview and the PDF.
    pub date_style: DateStyle,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            service_id: PLACEHOLDER_SERVICE_ID.to_string(),
            template_id: PLACEHOLDER_TEMPLATE_ID.to_string(),
            user_id: PLACEHOLDER_USER_ID.to_string(),
            access_token: None,
            from_name: "Undertaker App".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EmailConfig {
    /// Name of the first credential that is empty or still a placeholder.
    #[must_use]
    pub fn missing_credential(&self) -> Option<&'static str> {
        let unset = |value: &str, placeholder: &str| value.trim().is_empty() || value == placeholder;
        if unset(&self.service_id, PLACEHOLDER_SERVICE_ID) {
            Some("service_id")
        } else if unset(&self.template_id, PLACEHOLDER_TEMPLATE_ID) {
            Some("template_id")
        } else if unset(&self.user_id, PLACEHOLDER_USER_ID) {
            Some("user_id")
        } else {
            None
        }
    }

    /// Whether real credentials have been supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_credential().is_none()
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "digital-will.pdf".to_string(),
            jpeg_quality: 100,
            date_style: DateStyle::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("UNDERTAKER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// Placeholder email credentials are not an error here; sending checks
    /// for them on its own so that the rest of the app works without them.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jpeg_quality must be between 1 and 100, got {}",
                    self.export.jpeg_quality
                ),
            });
        }

        if self.export.file_name.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "export file_name must not be empty".to_string(),
            });
        }

        if !(self.email.endpoint.starts_with("https://")
            || self.email.endpoint.starts_with("http://"))
        {
            return Err(Error::ConfigValidation {
                message: format!("email endpoint is not an http(s) URL: {}", self.email.endpoint),
            });
        }

        if self.email.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "email timeout_secs must be greater than 0".to_string(),
            });
        }

        if let Some(uid) = &self.session.uid {
            if uid.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "session uid must not be blank".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The configured session, if a uid is set.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.uid.as_ref().map(|uid| Session {
            uid: uid.clone(),
            email: self.session.email.clone(),
            display_name: self.session.display_name.clone(),
        })
    }
}
