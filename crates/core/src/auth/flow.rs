//! OAuth flow manager - core business logic

use std::sync::Arc;
use std::time::Duration;

use profilelink_common::auth::{
    OAuthClientError, OAuthClientTrait, PKCEChallenge, TokenRecord, TokenResponse,
};
use profilelink_common::cache::{StoreError, TimedStore, TypedStore};
use profilelink_common::time::{Clock, SystemClock};
use profilelink_domain::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, REFRESH_GUARD_TTL_SECS, STATE_TTL_SECS,
};
use profilelink_domain::{ProfileLinkError, Result};
use tracing::{debug, info, warn};

use super::state::{AuthorizationRequest, PKCEState};
use crate::errors::IntoDomainError;
use crate::keys::{self, fingerprint};

const STATE_ALLOCATION_ATTEMPTS: usize = 3;

/// Issues authorization URLs, validates callbacks and manages tokens.
///
/// Holds no per-attempt state in memory; everything an attempt needs lives
/// in the shared store, so any instance can complete an attempt another one
/// began.
pub struct OAuthFlowManager {
    client: Arc<dyn OAuthClientTrait>,
    store: TypedStore,
    clock: Arc<dyn Clock>,
    state_ttl: Duration,
    exchange_timeout: Duration,
}

impl OAuthFlowManager {
    /// Create a flow manager with a 300s state TTL and 30s exchange bound.
    pub fn new(client: Arc<dyn OAuthClientTrait>, store: Arc<dyn TimedStore>) -> Self {
        Self {
            client,
            store: TypedStore::new(store),
            clock: Arc::new(SystemClock),
            state_ttl: Duration::from_secs(STATE_TTL_SECS),
            exchange_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Bound for a single token endpoint call.
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    /// Start an attempt: persist fresh PKCE material and build the URL.
    ///
    /// # Errors
    /// `StoreUnavailable` if the state cannot be persisted. No URL is handed
    /// out for a state the callback could never validate.
    pub async fn begin_authorization(&self) -> Result<AuthorizationRequest> {
        let (challenge, pending) = self.reserve_state().await?;

        let url = self.client.authorization_url(&challenge);
        info!(
            state = %fingerprint(&pending.state),
            ttl_secs = self.state_ttl.as_secs(),
            "authorization started"
        );

        Ok(AuthorizationRequest { url, state: challenge.state })
    }

    /// Finish an attempt: consume `state` and exchange `code` for a token.
    ///
    /// # Errors
    /// - `InvalidInput` if `code` is empty
    /// - `InvalidState` if `state` was never issued, already used or expired
    /// - `StoreUnavailable` if the store cannot be reached; never reported
    ///   as `InvalidState`
    /// - `Auth` / `InvalidResponse` / `Timeout` from the exchange
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Result<TokenRecord> {
        if code.trim().is_empty() {
            return Err(ProfileLinkError::InvalidInput("authorization code is empty".into()));
        }

        let pending = self.consume_state(state).await?;
        debug!(
            state = %fingerprint(state),
            age_ms = (self.clock.utc_now() - pending.issued_at).num_milliseconds(),
            "state consumed"
        );

        let response = self
            .bounded("token exchange", self.client.exchange_code(code, &pending.code_verifier))
            .await
            .inspect_err(|err| {
                warn!(state = %fingerprint(state), error = %err, "code exchange failed");
            })?;

        let record = self.stamp(response)?;
        info!(state = %fingerprint(state), expires_in = record.expires_in, "authorization completed");
        Ok(record)
    }

    /// Exchange `refresh_token` for a new token and persist it for `subject`.
    ///
    /// Each refresh token can be used once: the first caller claims it, any
    /// later or concurrent caller gets `TokenConsumed`. The claim is released
    /// when the exchange fails, or when the provider hands back the same
    /// refresh token, so the caller can use it again.
    ///
    /// # Errors
    /// `TokenConsumed`, `InvalidInput` for an empty token or subject,
    /// `StoreUnavailable` when the claim cannot be made or the new record
    /// cannot be persisted, and exchange errors. A persist failure happens
    /// after the exchange, so a rotated refresh token is already spent.
    pub async fn refresh_token(&self, subject: &str, refresh_token: &str) -> Result<TokenRecord> {
        if subject.trim().is_empty() {
            return Err(ProfileLinkError::InvalidInput("subject is empty".into()));
        }
        if refresh_token.is_empty() {
            return Err(ProfileLinkError::InvalidInput("refresh token is empty".into()));
        }

        let guard = keys::rotation_key(refresh_token);
        let claimed = self
            .store
            .inner()
            .put_if_absent(
                &guard,
                self.clock.utc_now().to_rfc3339(),
                Some(Duration::from_secs(REFRESH_GUARD_TTL_SECS)),
            )
            .await
            .map_err(IntoDomainError::into_domain)?;
        if !claimed {
            warn!(subject, "refresh token reused");
            return Err(ProfileLinkError::TokenConsumed);
        }

        let outcome = self
            .bounded("token refresh", self.client.refresh(refresh_token))
            .await
            .and_then(|response| self.stamp(response));

        let mut record = match outcome {
            Ok(record) => record,
            Err(err) => {
                self.release_guard(&guard).await;
                warn!(subject, error = %err, "token refresh failed");
                return Err(err);
            }
        };

        // Provider kept the old refresh token: it stays valid, so unblock it.
        if record.refresh_token.as_deref().map_or(true, |new| new == refresh_token) {
            record.refresh_token = Some(refresh_token.to_string());
            self.release_guard(&guard).await;
        }

        self.store_token(subject, &record).await.map_err(|err| {
            // The provider has already answered; a rotated refresh token is spent.
            warn!(subject, error = %err, "refreshed token not persisted");
            match err {
                ProfileLinkError::StoreUnavailable(reason) => ProfileLinkError::StoreUnavailable(
                    format!("token refreshed but not persisted: {reason}"),
                ),
                other => other,
            }
        })?;

        info!(subject, expires_in = record.expires_in, "token refreshed");
        Ok(record)
    }

    /// Persist `record` for `subject` with TTL equal to its lifetime.
    ///
    /// # Errors
    /// `InvalidInput` for an empty subject, `StoreUnavailable` on store
    /// failure.
    pub async fn store_token(&self, subject: &str, record: &TokenRecord) -> Result<()> {
        if subject.trim().is_empty() {
            return Err(ProfileLinkError::InvalidInput("subject is empty".into()));
        }
        if !self.is_token_live(record) {
            debug!(subject, "not storing expired token");
            return Ok(());
        }

        self.store
            .put_json(&keys::token_key(subject), record, Some(record.ttl()))
            .await
            .map_err(IntoDomainError::into_domain)
    }

    /// The stored token for `subject`, if any and still live.
    ///
    /// Expired or undecodable records read as `None`.
    ///
    /// # Errors
    /// `StoreUnavailable` on store failure.
    pub async fn live_token(&self, subject: &str) -> Result<Option<TokenRecord>> {
        match self.store.get_json::<TokenRecord>(&keys::token_key(subject)).await {
            Ok(record) => Ok(record.filter(|record| self.is_token_live(record))),
            Err(StoreError::Serialization(reason)) => {
                warn!(subject, %reason, "discarding undecodable token record");
                Ok(None)
            }
            Err(err) => Err(err.into_domain()),
        }
    }

    /// `now - created_at < expires_in * 1000`, in milliseconds.
    pub fn is_token_live(&self, record: &TokenRecord) -> bool {
        record.is_live_at(self.clock.utc_now())
    }

    /// Configured redirect URI of the underlying client.
    pub fn redirect_uri(&self) -> &str {
        self.client.redirect_uri()
    }

    async fn consume_state(&self, state: &str) -> Result<PKCEState> {
        match self.store.take_json::<PKCEState>(&keys::state_key(state)).await {
            Ok(Some(pending)) if pending.state == state => Ok(pending),
            Ok(_) => {
                warn!(state = %fingerprint(state), "unknown, expired or reused state");
                Err(ProfileLinkError::InvalidState)
            }
            Err(StoreError::Serialization(reason)) => {
                warn!(state = %fingerprint(state), %reason, "corrupt state entry");
                Err(ProfileLinkError::InvalidState)
            }
            Err(err) => Err(err.into_domain()),
        }
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl std::future::Future<Output = std::result::Result<T, OAuthClientError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.exchange_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(OAuthClientError::Timeout)) | Err(_) => {
                Err(ProfileLinkError::timeout(operation, self.exchange_timeout))
            }
            Ok(Err(err)) => Err(err.into_domain()),
        }
    }

    fn stamp(&self, response: TokenResponse) -> Result<TokenRecord> {
        if response.access_token.is_empty() {
            return Err(ProfileLinkError::InvalidResponse("empty access_token".into()));
        }
        Ok(TokenRecord::from_response(response, self.clock.utc_now()))
    }

    /// Persist a fresh state without overwriting one already in flight.
    async fn reserve_state(&self) -> Result<(PKCEChallenge, PKCEState)> {
        for _ in 0..STATE_ALLOCATION_ATTEMPTS {
            let challenge = PKCEChallenge::generate();
            let pending = PKCEState {
                state: challenge.state.clone(),
                code_verifier: challenge.code_verifier.clone(),
                issued_at: self.clock.utc_now(),
            };

            let placed = self
                .store
                .put_json_if_absent(&keys::state_key(&pending.state), &pending, Some(self.state_ttl))
                .await
                .map_err(IntoDomainError::into_domain)?;
            if placed {
                return Ok((challenge, pending));
            }
            warn!(state = %fingerprint(&pending.state), "state collision, regenerating");
        }

        Err(ProfileLinkError::Internal("could not allocate a unique state".into()))
    }

    async fn release_guard(&self, guard: &str) {
        if let Err(err) = self.store.delete(guard).await {
            warn!(error = %err, "failed to release refresh guard");
        }
    }
}
