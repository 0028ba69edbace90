//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If the required ones are missing, falls back to a config file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `PROFILELINK_CLIENT_ID`, `PROFILELINK_CLIENT_SECRET`,
//!   `PROFILELINK_REDIRECT_URI`
//!
//! Optional:
//! - `PROFILELINK_OAUTH_AUTHORITY`: OAuth base URL
//! - `PROFILELINK_SCOPES`: comma or space separated scope list
//! - `PROFILELINK_STORE_BACKEND`: `memory` or `redis`
//! - `PROFILELINK_REDIS_URL`, `PROFILELINK_KEY_PREFIX`
//! - `PROFILELINK_SOURCE_BASE_URL`
//! - `PROFILELINK_FETCH_TIMEOUT`, `PROFILELINK_EXCHANGE_TIMEOUT`: seconds
//! - `PROFILELINK_LOG_LEVEL`, `PROFILELINK_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./profilelink.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use profilelink_domain::{Config, ProfileLinkError, Result, StoreBackend};

const FILE_STEMS: [&str; 2] = ["config", "profilelink"];
const EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ProfileLinkError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Unset optional variables keep their defaults.
///
/// # Errors
/// Returns `ProfileLinkError::Config` if a required variable is missing, a
/// value does not parse, or the result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.oauth.client_id = env_var("PROFILELINK_CLIENT_ID")?;
    config.oauth.client_secret = env_var("PROFILELINK_CLIENT_SECRET")?;
    config.oauth.redirect_uri = env_var("PROFILELINK_REDIRECT_URI")?;

    if let Some(authority) = env_opt("PROFILELINK_OAUTH_AUTHORITY") {
        config.oauth.authority = authority;
    }
    if let Some(scopes) = env_opt("PROFILELINK_SCOPES") {
        config.oauth.scopes = parse_scopes(&scopes);
    }
    if let Some(secs) = env_parse::<u64>("PROFILELINK_EXCHANGE_TIMEOUT")? {
        config.oauth.exchange_timeout_secs = secs;
    }

    if let Some(backend) = env_opt("PROFILELINK_STORE_BACKEND") {
        config.store.backend = StoreBackend::from_str(&backend).map_err(ProfileLinkError::Config)?;
    }
    if let Some(url) = env_opt("PROFILELINK_REDIS_URL") {
        config.store.redis_url = Some(url);
    }
    if let Some(prefix) = env_opt("PROFILELINK_KEY_PREFIX") {
        config.store.key_prefix = prefix;
    }

    if let Some(base_url) = env_opt("PROFILELINK_SOURCE_BASE_URL") {
        config.source.base_url = base_url;
    }
    if let Some(secs) = env_parse::<u64>("PROFILELINK_FETCH_TIMEOUT")? {
        config.source.fetch_timeout_secs = secs;
    }

    if let Some(level) = env_opt("PROFILELINK_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("PROFILELINK_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is
/// detected by file extension.
///
/// # Errors
/// Returns `ProfileLinkError::Config` if no file is found, the format is
/// invalid, or the result fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ProfileLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ProfileLinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ProfileLinkError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ProfileLinkError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ProfileLinkError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ProfileLinkError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots.iter().flat_map(|root| candidates_in(root)).find(|path| path.exists())
}

fn candidates_in(root: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for stem in FILE_STEMS {
        for ext in EXTENSIONS {
            candidates.push(root.join(format!("{stem}.{ext}")));
        }
    }
    for parent in ["..", "../.."] {
        for ext in EXTENSIONS {
            candidates.push(root.join(parent).join(format!("config.{ext}")));
        }
    }
    candidates
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `ProfileLinkError::Config` if the variable is unset or blank.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ProfileLinkError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ProfileLinkError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
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
