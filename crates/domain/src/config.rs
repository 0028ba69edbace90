//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_KEY_PREFIX, DEFAULT_OAUTH_AUTHORITY, DEFAULT_SCOPES,
    DEFAULT_SOURCE_BASE_URL, DEFAULT_USER_AGENT, PROFILE_TTL_SECS, STATE_TTL_SECS,
};
use crate::errors::{ProfileLinkError, Result};
use crate::impl_domain_label_conversions;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oauth: OAuthSettings,
    pub store: StoreSettings,
    pub source: SourceSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Check the configuration for values that cannot work at runtime.
    ///
    /// # Errors
    /// Returns `ProfileLinkError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.oauth.validate()?;
        self.store.validate()?;
        self.source.validate()
    }
}

/// OAuth provider configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub authority: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub state_ttl_secs: u64,
    pub exchange_timeout_secs: u64,
}

impl OAuthSettings {
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        require_non_blank("oauth.client_id", &self.client_id)?;
        require_non_blank("oauth.client_secret", &self.client_secret)?;
        require_non_blank("oauth.redirect_uri", &self.redirect_uri)?;
        require_http_url("oauth.authority", &self.authority)?;
        require_http_url("oauth.redirect_uri", &self.redirect_uri)?;
        require_positive("oauth.state_ttl_secs", self.state_ttl_secs)?;
        require_positive("oauth.exchange_timeout_secs", self.exchange_timeout_secs)
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            authority: DEFAULT_OAUTH_AUTHORITY.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            state_ttl_secs: STATE_TTL_SECS,
            exchange_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("state_ttl_secs", &self.state_ttl_secs)
            .field("exchange_timeout_secs", &self.exchange_timeout_secs)
            .finish()
    }
}

/// Which `TimedStore` backend to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

impl_domain_label_conversions!(StoreBackend {
    Memory => "memory",
    Redis => "redis",
});

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
    /// Prepended to every key written by the Redis backend.
    pub key_prefix: String,
}

impl StoreSettings {
    fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Redis {
            let url = self.redis_url.as_deref().unwrap_or_default();
            require_non_blank("store.redis_url", url)?;
            Url::parse(url).map_err(|e| {
                ProfileLinkError::Config(format!("store.redis_url is not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Profile source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub base_url: String,
    pub fetch_timeout_secs: u64,
    pub profile_ttl_secs: u64,
    pub user_agent: String,
}

impl SourceSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn profile_ttl(&self) -> Duration {
        Duration::from_secs(self.profile_ttl_secs)
    }

    fn validate(&self) -> Result<()> {
        require_http_url("source.base_url", &self.base_url)?;
        require_positive("source.fetch_timeout_secs", self.fetch_timeout_secs)?;
        require_positive("source.profile_ttl_secs", self.profile_ttl_secs)
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOURCE_BASE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            profile_ttl_secs: PROFILE_TTL_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProfileLinkError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(ProfileLinkError::Config(format!("{field} must be greater than zero")));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| ProfileLinkError::Config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ProfileLinkError::Config(format!("{field} has unsupported scheme {other}"))),
    }
}
