//! OAuth 2.0 client implementation with PKCE support
//!
//! Builds authorization URLs and performs the two token endpoint calls:
//! - Authorization code exchange (`grant_type=authorization_code`)
//! - Token refresh (`grant_type=refresh_token`)
//!
//! Both calls authenticate with HTTP Basic `client_id:client_secret` and post
//! an `application/x-www-form-urlencoded` body. The client never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::pkce::PKCEChallenge;
use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, TokenResponse};
use crate::error::{ErrorClassification, ErrorSeverity};

/// Default bound for a single token endpoint call.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for OAuth client operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthClientError {
    /// Token endpoint answered with a non-success status.
    ///
    /// `body` is kept for diagnostics only and must not reach end users.
    Remote { status: u16, body: String },

    /// Token endpoint answered 2xx with a body that is not a token response
    InvalidResponse(String),

    /// The request did not complete within the client timeout
    Timeout,

    /// Connection or protocol failure before a response was received
    Transport(String),

    /// No refresh token available
    NoRefreshToken,

    /// Invalid configuration
    ConfigError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { status, .. } => write!(f, "Token endpoint returned HTTP {status}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid token response: {msg}"),
            Self::Timeout => write!(f, "Token request timed out"),
            Self::Transport(msg) => write!(f, "HTTP request failed: {msg}"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl ErrorClassification for OAuthClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout | Self::Transport(_) => true,
            Self::InvalidResponse(_) | Self::NoRefreshToken | Self::ConfigError(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Remote { status, .. } if *status < 500 => ErrorSeverity::Warning,
            Self::NoRefreshToken => ErrorSeverity::Warning,
            Self::ConfigError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }
}

/// OAuth 2.0 client with PKCE support
///
/// Stateless: PKCE material is generated by the caller and passed in, so
/// one client can serve any number of concurrent authorization attempts.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the default 30 second request timeout
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be built.
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        Self::with_timeout(config, DEFAULT_TOKEN_TIMEOUT)
    }

    /// Create a new OAuth client with an explicit request timeout
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be built.
    pub fn with_timeout(config: OAuthConfig, timeout: Duration) -> Result<Self, OAuthClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build the browser authorization URL for `challenge`
    ///
    /// Embeds `response_type=code`, `client_id`, `redirect_uri`, `state`,
    /// the space-joined `scope`, `code_challenge` and
    /// `code_challenge_method=S256`.
    #[must_use]
    pub fn authorization_url(&self, challenge: &PKCEChallenge) -> String {
        let scope_string = self.config.scope_string();

        let params = [
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("state", challenge.state.as_str()),
            ("scope", scope_string.as_str()),
            ("code_challenge", challenge.code_challenge.as_str()),
            ("code_challenge_method", challenge.challenge_method()),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.config.authorization_url(), query_string)
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// - `Remote` if the token endpoint rejects the exchange
    /// - `InvalidResponse` if the success body is not a token response
    /// - `Timeout` / `Transport` on network failures
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];

        self.post_token_request(&form).await
    }

    /// Refresh an access token using a refresh token
    ///
    /// # Errors
    /// - `NoRefreshToken` if `refresh_token` is empty
    /// - otherwise the same as [`OAuthClient::exchange_code`]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret()),
        ];

        self.post_token_request(&form).await
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    async fn post_token_request(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, OAuthClientError> {
        let url = self.config.token_url();
        debug!(%url, grant_type = form.first().map(|(_, v)| *v), "posting token request");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret()))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "token endpoint rejected request");
            return Err(OAuthClientError::Remote { status: status.as_u16(), body });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| OAuthClientError::InvalidResponse(e.to_string()))
    }
}

// Implement OAuthClientTrait for OAuthClient
#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, challenge: &PKCEChallenge) -> String {
        self.authorization_url(challenge)
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_code(code, code_verifier).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        self.refresh(refresh_token).await
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uri()
    }
}
