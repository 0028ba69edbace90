//! Application context - dependency injection container
//!
//! Wires the configured store, OAuth client and profile source into the
//! flow manager and the cache coordinator, and exposes the logical calls a
//! transport layer needs. Every call is logged with its outcome and timing.

use std::sync::Arc;
use std::time::Instant;

use profilelink_common::auth::{OAuthClient, OAuthClientTrait, OAuthConfig, TokenRecord};
use profilelink_common::cache::{StoreHealth, TimedStore};
use profilelink_core::{
    AuthorizationRequest, OAuthFlowManager, ProfileCacheCoordinator, ProfileLookup, ProfileSource,
};
use profilelink_domain::{Config, Credential, ProfileLinkError, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::integrations::HttpProfileSource;
use crate::observability::log_operation;
use crate::store::open_store;

/// Holds the long-lived collaborators for one deployment.
pub struct ProfileLinkContext {
    config: Config,
    store: Arc<dyn TimedStore>,
    source: Arc<dyn ProfileSource>,
    flow: OAuthFlowManager,
    profiles: ProfileCacheCoordinator,
}

impl ProfileLinkContext {
    /// Build the production wiring for `config`.
    ///
    /// # Errors
    /// `Config` when the configuration is invalid or a client cannot be
    /// built.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = open_store(&config.store)?;
        let oauth = OAuthConfig::new(
            config.oauth.authority.clone(),
            config.oauth.client_id.clone(),
            config.oauth.client_secret.clone(),
            config.oauth.redirect_uri.clone(),
            config.oauth.scopes.clone(),
        );
        let client = OAuthClient::with_timeout(oauth, config.oauth.exchange_timeout())
            .map_err(|e| ProfileLinkError::Config(format!("cannot build OAuth client: {e}")))?;
        let source = HttpProfileSource::new(&config.source)?;

        info!(
            backend = %config.store.backend,
            authority = %config.oauth.authority,
            source = %config.source.base_url,
            "profilelink context ready"
        );
        Ok(Self::from_parts(config.clone(), store, Arc::new(client), Arc::new(source)))
    }

    /// Assemble a context from already-built collaborators.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn TimedStore>,
        client: Arc<dyn OAuthClientTrait>,
        source: Arc<dyn ProfileSource>,
    ) -> Self {
        let flow = OAuthFlowManager::new(client, Arc::clone(&store))
            .with_state_ttl(config.oauth.state_ttl())
            .with_exchange_timeout(config.oauth.exchange_timeout());
        let profiles = ProfileCacheCoordinator::new(Arc::clone(&source), Arc::clone(&store))
            .with_profile_ttl(config.source.profile_ttl())
            .with_fetch_timeout(config.source.fetch_timeout());

        Self { config, store, source, flow, profiles }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn flow(&self) -> &OAuthFlowManager {
        &self.flow
    }

    pub fn profiles(&self) -> &ProfileCacheCoordinator {
        &self.profiles
    }

    /// Start an authorization attempt and return the URL to redirect to.
    pub async fn begin_auth(&self) -> Result<AuthorizationRequest> {
        let started = Instant::now();
        let result = self.flow.begin_authorization().await;
        log_operation("begin_auth", started.elapsed(), &result);
        result
    }

    /// Finish an attempt with the `code` and `state` from the callback.
    pub async fn complete_auth(&self, code: &str, state: &str) -> Result<TokenRecord> {
        let started = Instant::now();
        let result = self.flow.complete_authorization(code, state).await;
        log_operation("complete_auth", started.elapsed(), &result);
        result
    }

    /// Keep `record` for `subject` until the access token expires.
    pub async fn store_token(&self, subject: &str, record: &TokenRecord) -> Result<()> {
        let started = Instant::now();
        let result = self.flow.store_token(subject, record).await;
        log_operation("store_token", started.elapsed(), &result);
        result
    }

    /// Exchange a refresh token for `subject`.
    pub async fn refresh_token(&self, subject: &str, refresh_token: &str) -> Result<TokenRecord> {
        let started = Instant::now();
        let result = self.flow.refresh_token(subject, refresh_token).await;
        log_operation("refresh_token", started.elapsed(), &result);
        result
    }

    /// Look up the profile for `key` using the caller's session cookie.
    pub async fn get_profile(&self, key: &str, session_cookie: &str) -> Result<ProfileLookup> {
        self.get_profile_with_cancel(key, session_cookie, &CancellationToken::new()).await
    }

    /// [`get_profile`](Self::get_profile) bound to the caller's cancellation.
    pub async fn get_profile_with_cancel(
        &self,
        key: &str,
        session_cookie: &str,
        cancel: &CancellationToken,
    ) -> Result<ProfileLookup> {
        let started = Instant::now();
        let result = match Credential::parse_session_cookie(session_cookie) {
            Ok(credential) => self.profiles.get_profile_with_cancel(key, &credential, cancel).await,
            Err(err) => Err(err),
        };
        log_operation("get_profile", started.elapsed(), &result);
        result
    }

    /// Whether the profile source accepts the caller's session cookie.
    pub async fn check_credential(&self, session_cookie: &str) -> Result<bool> {
        let started = Instant::now();
        let result = match Credential::parse_session_cookie(session_cookie) {
            Ok(credential) => self.source.validate_credential(&credential).await,
            Err(err) => Err(err),
        };
        log_operation("check_credential", started.elapsed(), &result);
        result
    }

    /// Probe the backing store.
    pub async fn health(&self) -> StoreHealth {
        let health = self.store.ping().await;
        if let StoreHealth::Unhealthy(reason) = &health {
            warn!(reason = %reason, "store health probe failed");
        }
        health
    }

    /// Close the store. Later calls that need it fail with
    /// `StoreUnavailable`.
    pub async fn shutdown(&self) -> Result<()> {
        self.store
            .close()
            .await
            .map_err(|e| ProfileLinkError::StoreUnavailable(e.to_string()))?;
        info!("profilelink context shut down");
        Ok(())
    }
}
