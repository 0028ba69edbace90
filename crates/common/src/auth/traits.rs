//! Traits for OAuth operations
//!
//! Abstracts the provider's token endpoint so the authorization flow can be
//! driven against a mock in tests.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::pkce::PKCEChallenge;
use super::types::TokenResponse;

/// Trait for OAuth client operations
///
/// Implementations hold no per-attempt state. PKCE material and the `state`
/// value are owned by the caller, which is responsible for persisting them
/// between [`OAuthClientTrait::authorization_url`] and
/// [`OAuthClientTrait::exchange_code`].
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the browser authorization URL for the given PKCE challenge
    fn authorization_url(&self, challenge: &PKCEChallenge) -> String;

    /// Exchange authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from redirect callback
    /// * `code_verifier` - Verifier whose challenge was sent in the
    ///   authorization URL
    ///
    /// # Errors
    /// Returns error if the token endpoint rejects the exchange or the
    /// response cannot be parsed
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, OAuthClientError>;

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError>;

    /// Get the configured redirect URI
    fn redirect_uri(&self) -> &str;
}
