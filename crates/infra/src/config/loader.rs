//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the Google client id is not set there, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CREWCAL_GOOGLE_CLIENT_ID`: OAuth client id (required for env loading)
//! - `CREWCAL_GOOGLE_CLIENT_SECRET`: OAuth client secret
//! - `CREWCAL_CALENDAR_NAME`: Target calendar name
//! - `CREWCAL_TIMEZONE`: IANA time zone for pushed events
//! - `CREWCAL_TOKEN_PATH`: Token file; keychain storage when unset
//! - `CREWCAL_PORTAL_URL`: Crew scheduling portal URL
//! - `CREWCAL_ARCHIVE_DIR`: Directory fetched schedule pages are copied to
//! - `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY`: Pairing storage (both or
//!   neither)
//! - `CREWCAL_PRESERVE_PAST`: Keep past trips when syncing (true/false)
//! - `CREWCAL_PADDED_SPAN`: Two-day initial span for new trips (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./crewcal.toml` or `./crewcal.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use crewcal_domain::constants::{DEFAULT_CALENDAR_NAME, DEFAULT_PORTAL_URL, DEFAULT_TIMEZONE};
use crewcal_domain::{
    Config, CrewCalError, GoogleConfig, LoggingConfig, PortalConfig, Result, SupabaseConfig,
    SyncConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["crewcal.toml", "crewcal.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CrewCalError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration for the CLI.
///
/// An explicit path must exist. Without one, environment and probed files
/// are tried and defaults are used when neither is available, so commands
/// that need no credentials (such as `parse`) still work.
pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
    if path.is_some() {
        return load_from_file(path);
    }

    if let Ok(config) = load_from_env() {
        tracing::debug!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(found) => load_from_file(Some(found)),
        None => {
            tracing::debug!("No configuration found, using defaults");
            let mut config = Config::default();
            config.supabase = supabase_from_env()?;
            Ok(config)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CREWCAL_GOOGLE_CLIENT_ID` is required; everything else falls back
/// to its default.
///
/// # Errors
/// Returns `CrewCalError::Config` if the client id is missing or only one
/// of the Supabase variables is set.
pub fn load_from_env() -> Result<Config> {
    let client_id = env_var("CREWCAL_GOOGLE_CLIENT_ID")?;
    let defaults = GoogleConfig::default();

    Ok(Config {
        portal: PortalConfig {
            url: env_or("CREWCAL_PORTAL_URL", DEFAULT_PORTAL_URL),
            archive_dir: env_opt("CREWCAL_ARCHIVE_DIR"),
        },
        google: GoogleConfig {
            client_id,
            client_secret: env_opt("CREWCAL_GOOGLE_CLIENT_SECRET"),
            calendar_name: env_or("CREWCAL_CALENDAR_NAME", DEFAULT_CALENDAR_NAME),
            timezone: env_or("CREWCAL_TIMEZONE", DEFAULT_TIMEZONE),
            token_path: env_opt("CREWCAL_TOKEN_PATH"),
            account: defaults.account,
        },
        supabase: supabase_from_env()?,
        sync: SyncConfig {
            preserve_past: env_bool("CREWCAL_PRESERVE_PAST", false),
            padded_span: env_bool("CREWCAL_PADDED_SPAN", false),
        },
        logging: LoggingConfig::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CrewCalError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CrewCalError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CrewCalError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CrewCalError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CrewCalError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CrewCalError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CrewCalError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, its two parents and the executable's
/// directory for the known file names.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
        roots.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Supabase settings are optional, but half a configuration is an error.
fn supabase_from_env() -> Result<Option<SupabaseConfig>> {
    match (env_opt("SUPABASE_URL"), env_opt("SUPABASE_SERVICE_ROLE_KEY")) {
        (Some(url), Some(service_role_key)) => Ok(Some(SupabaseConfig { url, service_role_key })),
        (None, None) => Ok(None),
        _ => Err(CrewCalError::Config(
            "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set together".to_string(),
        )),
    }
}

/// Get required environment variable
///
/// # Errors
/// Returns `CrewCalError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CrewCalError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
