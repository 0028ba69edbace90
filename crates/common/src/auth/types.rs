//! OAuth 2.0 types and structures
//!
//! Token records, the raw token endpoint response, and the provider
//! configuration used to build authorization and token URLs.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access token issued by an authorization code or refresh exchange.
///
/// A record is live while `now - created_at < expires_in * 1000` (in
/// milliseconds); at exact equality it is already expired. Callers treat an
/// expired record as absent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Bearer token for API authentication
    pub access_token: String,

    /// Access token lifetime in seconds
    pub expires_in: u64,

    /// Refresh token, when the provider issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the exchange completed, persisted as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Stamp a token endpoint response with its creation time.
    #[must_use]
    pub fn from_response(response: TokenResponse, created_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            expires_in: response.expires_in,
            refresh_token: response.refresh_token,
            created_at,
        }
    }

    /// Whether the access token is still usable at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed_ms = now.signed_duration_since(self.created_at).num_milliseconds();
        let lifetime_ms = i64::try_from(self.expires_in).unwrap_or(i64::MAX).saturating_mul(1000);
        elapsed_ms < lifetime_ms
    }

    /// Store TTL matching the access token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"***")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// OAuth token response from authorization server
///
/// Only the fields the flow relies on are required; anything else the
/// provider adds is ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"***")
            .field("expires_in", &self.expires_in)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// OAuth configuration for the authorization server
#[derive(Clone)]
pub struct OAuthConfig {
    /// Base URL of the OAuth authority (e.g.
    /// `https://www.linkedin.com/oauth/v2`)
    pub authority: String,

    /// OAuth client ID
    pub client_id: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// OAuth scopes to request
    pub scopes: Vec<String>,

    client_secret: String,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(
        authority: String,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scopes: Vec<String>,
    ) -> Self {
        Self { authority, client_id, redirect_uri, scopes, client_secret }
    }

    /// Get the authorization URL: `<authority>/authorization`
    #[must_use]
    pub fn authorization_url(&self) -> String {
        format!("{}/authorization", self.authority.trim_end_matches('/'))
    }

    /// Get the token URL: `<authority>/accessToken`
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/accessToken", self.authority.trim_end_matches('/'))
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Client secret used for HTTP Basic auth and refresh requests
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use chrono::TimeZone;

    use super::*;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single().unwrap()
    }

    fn record(expires_in: u64) -> TokenRecord {
        TokenRecord {
            access_token: "access".to_string(),
            expires_in,
            refresh_token: Some("refresh".to_string()),
            created_at: created_at(),
        }
    }

    /// Validates `TokenRecord::is_live_at` behavior for the liveness boundary
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures the token is live one millisecond before expiry.
    /// - Ensures the token is expired at exact equality.
    #[test]
    fn test_liveness_boundary() {
        let token = record(3600);
        let expiry = created_at() + chrono::Duration::seconds(3600);

        assert!(token.is_live_at(created_at()));
        assert!(token.is_live_at(expiry - chrono::Duration::milliseconds(1)));
        assert!(!token.is_live_at(expiry));
        assert!(!token.is_live_at(expiry + chrono::Duration::seconds(1)));
    }

    /// Validates `TokenRecord::is_live_at` behavior for the zero lifetime
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a zero `expires_in` is never live.
    #[test]
    fn test_zero_lifetime_is_expired() {
        assert!(!record(0).is_live_at(created_at()));
    }

    /// Validates `TokenRecord::from_response` behavior for the token response
    /// conversion scenario.
    ///
    /// Assertions:
    /// - Confirms fields are carried over and `created_at` is stamped.
    #[test]
    fn test_token_response_conversion() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a1","expires_in":5184000,"scope":"openid","token_type":"Bearer"}"#,
        )
        .unwrap();

        let token = TokenRecord::from_response(response, created_at());

        assert_eq!(token.access_token, "a1");
        assert_eq!(token.expires_in, 5_184_000);
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.created_at, created_at());
        assert_eq!(token.ttl(), Duration::from_secs(5_184_000));
    }

    /// Validates the token record wire format scenario.
    ///
    /// Assertions:
    /// - Confirms `created_at` is persisted as epoch milliseconds.
    #[test]
    fn test_created_at_serialized_as_millis() {
        let json = serde_json::to_value(record(60)).unwrap();
        assert_eq!(json["created_at"], serde_json::json!(created_at().timestamp_millis()));

        let back: TokenRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record(60));
    }

    /// Validates `OAuthConfig::new` behavior for the oauth config urls
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms authorization and token URLs hang off the authority.
    /// - Confirms scopes are space-joined.
    #[test]
    fn test_oauth_config_urls() {
        let config = OAuthConfig::new(
            "https://www.linkedin.com/oauth/v2/".to_string(),
            "client123".to_string(),
            "secret".to_string(),
            "http://localhost:3000/callback".to_string(),
            vec!["openid".to_string(), "profile".to_string()],
        );

        assert_eq!(config.authorization_url(), "https://www.linkedin.com/oauth/v2/authorization");
        assert_eq!(config.token_url(), "https://www.linkedin.com/oauth/v2/accessToken");
        assert_eq!(config.scope_string(), "openid profile");
    }

    /// Validates the secret redaction scenario.
    ///
    /// Assertions:
    /// - Ensures secrets and tokens never appear in `Debug` output.
    #[test]
    fn test_debug_redacts_secrets() {
        let config = OAuthConfig::new(
            "https://auth.example".into(),
            "id".into(),
            "top-secret".into(),
            "http://localhost/cb".into(),
            vec![],
        );
        assert!(!format!("{config:?}").contains("top-secret"));
        assert!(!format!("{:?}", record(1)).contains("access\""));
    }
}
