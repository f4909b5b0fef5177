//! Configuration structures
//!
//! Loaded by `crewcal_infra::config` from the environment or a TOML/JSON file.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CALENDAR_NAME, DEFAULT_PORTAL_URL, DEFAULT_TIMEZONE};
use crate::errors::{CrewCalError, Result};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Crew scheduling portal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default = "default_portal_url")]
    pub url: String,
    /// Where fetched schedule pages are archived, if anywhere.
    #[serde(default)]
    pub archive_dir: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self { url: default_portal_url(), archive_dir: None }
    }
}

/// Google Calendar and OAuth settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Token file; the platform keychain is used when unset.
    #[serde(default)]
    pub token_path: Option<String>,
    /// Account name the OAuth tokens are stored under.
    #[serde(default = "default_account")]
    pub account: String,
}

impl GoogleConfig {
    /// Ensure the OAuth client is usable.
    pub fn require_client(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(CrewCalError::Config(
                "Google client id is not configured (CREWCAL_GOOGLE_CLIENT_ID)".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            calendar_name: default_calendar_name(),
            timezone: default_timezone(),
            token_path: None,
            account: default_account(),
        }
    }
}

/// Supabase project settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

/// Sync behaviour defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Keep already-started trips when clearing old events.
    #[serde(default)]
    pub preserve_past: bool,
    /// Use the legacy two-day initial span for new trip events.
    #[serde(default)]
    pub padded_span: bool,
}

/// Logging defaults; CLI flags take precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_portal_url() -> String {
    DEFAULT_PORTAL_URL.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_account() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.google.calendar_name, DEFAULT_CALENDAR_NAME);
        assert_eq!(config.google.timezone, DEFAULT_TIMEZONE);
        assert!(config.supabase.is_none());
    }

    #[test]
    fn missing_client_id_is_a_config_error() {
        let err = GoogleConfig::default().require_client().unwrap_err();
        assert!(matches!(err, CrewCalError::Config(_)));
    }
}
