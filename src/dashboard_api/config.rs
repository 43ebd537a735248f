//! Environment-driven client configuration.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CBD_DASHBOARD` | required | Dashboard hostname |
//! | `CBD_PORT` | `443` | Dashboard HTTPS port |
//! | `CBD_KEY_ID` | required | Access key id |
//! | `CBD_SECRET` | required | Access key secret |
//! | `CBD_APP_NAME` | `cbdscript.example.com` | Token issuer |
//! | `CBD_APP_VERSION` | `1.0` | Application version claim |
//! | `CBD_CLIENT_ID` | generated UUID | Client id claim |
//! | `CBD_VERIFY_CERT` | `true` | Set to `false` for self-signed dashboards |
//! | `CBD_TOKEN_LIFETIME` | `3600` | Token lifetime in seconds |

use crate::dashboard_api::jwt::{DEFAULT_APP_NAME, DEFAULT_APP_VERSION, DEFAULT_TOKEN_LIFETIME};
use crate::dashboard_api::settings::DashboardSettings;
use crate::dashboard_api::types::DashboardError;
use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;

pub const ENV_DASHBOARD: &str = "CBD_DASHBOARD";
pub const ENV_PORT: &str = "CBD_PORT";
pub const ENV_KEY_ID: &str = "CBD_KEY_ID";
pub const ENV_SECRET: &str = "CBD_SECRET";
pub const ENV_APP_NAME: &str = "CBD_APP_NAME";
pub const ENV_APP_VERSION: &str = "CBD_APP_VERSION";
pub const ENV_CLIENT_ID: &str = "CBD_CLIENT_ID";
pub const ENV_VERIFY_CERT: &str = "CBD_VERIFY_CERT";
pub const ENV_TOKEN_LIFETIME: &str = "CBD_TOKEN_LIFETIME";

/// Default dashboard HTTPS port
pub const DEFAULT_PORT: u16 = 443;

/// Everything needed to build a [`DashboardClient`](crate::DashboardClient)
#[derive(Debug)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    pub key_id: String,
    pub secret: SecretString,
    pub app_name: String,
    pub app_version: String,
    /// Generated when `None`
    pub client_id: Option<String>,
    /// Verify the dashboard's TLS certificate
    pub verify_cert: bool,
    pub token_lifetime: u64,
}

impl DashboardConfig {
    /// Configuration with defaults for everything but the required fields
    pub fn new(
        host: impl Into<String>,
        key_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            key_id: key_id.into(),
            secret: SecretString::from(secret.into()),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            client_id: None,
            verify_cert: true,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
        }
    }

    /// Load configuration from `CBD_*` environment variables
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                DashboardError::Config(format!("Missing required environment variable {}", key))
            })
        };

        let mut config = Self::new(
            required(ENV_DASHBOARD)?,
            required(ENV_KEY_ID)?,
            required(ENV_SECRET)?,
        );

        if let Some(port) = get(ENV_PORT) {
            config.port = parse_value(ENV_PORT, &port)?;
        }
        if let Some(app_name) = get(ENV_APP_NAME) {
            config.app_name = app_name;
        }
        if let Some(app_version) = get(ENV_APP_VERSION) {
            config.app_version = app_version;
        }
        config.client_id = get(ENV_CLIENT_ID);
        if let Some(verify) = get(ENV_VERIFY_CERT) {
            config.verify_cert = parse_bool(ENV_VERIFY_CERT, &verify)?;
        }
        if let Some(lifetime) = get(ENV_TOKEN_LIFETIME) {
            config.token_lifetime = parse_value(ENV_TOKEN_LIFETIME, &lifetime)?;
        }

        tracing::debug!(
            "Loaded dashboard configuration: host={}, port={}, verify_cert={}",
            config.host,
            config.port,
            config.verify_cert
        );
        Ok(config)
    }

    /// Build session settings from this configuration
    pub fn to_settings(&self) -> DashboardSettings {
        let settings = DashboardSettings::new(
            self.host.as_str(),
            self.port,
            self.key_id.as_str(),
            self.secret.expose_secret(),
        )
        .with_app_name(self.app_name.as_str())
        .with_app_version(self.app_version.as_str())
        .with_lifetime(self.token_lifetime);

        match &self.client_id {
            Some(client_id) => settings.with_client_id(client_id.as_str()),
            None => settings,
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, DashboardError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| DashboardError::Config(format!("Invalid value for {}: {} ({})", key, raw, e)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, DashboardError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DashboardError::Config(format!(
            "Invalid value for {}: {} (expected true or false)",
            key, raw
        ))),
    }
}
