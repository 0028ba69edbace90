//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{OAuthClientError, OAuthClientTrait, PKCEChallenge, TokenResponse};
use crate::cache::{MemoryStore, StoreError, StoreHealth, StoreResult, TimedStore};
use crate::time::Clock;

type Scripted = Arc<Mutex<Result<TokenResponse, OAuthClientError>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn default_tokens(prefix: &str) -> TokenResponse {
    TokenResponse {
        access_token: format!("{prefix}_access_token"),
        expires_in: 3600,
        refresh_token: Some(format!("{prefix}_refresh_token")),
    }
}

/// Mock OAuth client for testing
///
/// Returns scripted results for `exchange_code` and `refresh` and records
/// how often each was called. An optional delay lets tests exercise
/// timeouts and cancellation.
///
/// # Examples
///
/// ```
/// use profilelink_common::testing::MockOAuthClient;
///
/// let client = MockOAuthClient::new();
/// client.set_exchange_error(profilelink_common::auth::OAuthClientError::Remote {
///     status: 401,
///     body: String::new(),
/// });
/// assert_eq!(client.exchange_calls(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockOAuthClient {
    exchange_result: Scripted,
    refresh_result: Scripted,
    exchange_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    last_verifier: Arc<Mutex<Option<String>>>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockOAuthClient {
    /// Create a new mock OAuth client that succeeds with default tokens.
    pub fn new() -> Self {
        Self {
            exchange_result: Arc::new(Mutex::new(Ok(default_tokens("mock")))),
            refresh_result: Arc::new(Mutex::new(Ok(default_tokens("refreshed")))),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            last_verifier: Arc::new(Mutex::new(None)),
            last_refresh_token: Arc::new(Mutex::new(None)),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Configure the tokens returned by `exchange_code`.
    pub fn set_exchange_response(&self, tokens: TokenResponse) {
        *lock(&self.exchange_result) = Ok(tokens);
    }

    /// Force `exchange_code` to fail with `error`.
    pub fn set_exchange_error(&self, error: OAuthClientError) {
        *lock(&self.exchange_result) = Err(error);
    }

    /// Configure the tokens returned by `refresh`.
    pub fn set_refresh_response(&self, tokens: TokenResponse) {
        *lock(&self.refresh_result) = Ok(tokens);
    }

    /// Force `refresh` to fail with `error`.
    pub fn set_refresh_error(&self, error: OAuthClientError) {
        *lock(&self.refresh_result) = Err(error);
    }

    /// Delay every token call by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Number of `exchange_code` calls so far.
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Number of `refresh` calls so far.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Verifier passed to the most recent `exchange_code` call.
    #[must_use]
    pub fn last_verifier(&self) -> Option<String> {
        lock(&self.last_verifier).clone()
    }

    /// Refresh token passed to the most recent `refresh` call.
    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        lock(&self.last_refresh_token).clone()
    }

    async fn maybe_delay(&self) {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, challenge: &PKCEChallenge) -> String {
        format!(
            "https://mock.oauth.test/authorization?state={}&code_challenge={}&code_challenge_method={}",
            challenge.state,
            challenge.code_challenge,
            challenge.challenge_method()
        )
    }

    async fn exchange_code(
        &self,
        _code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_verifier) = Some(code_verifier.to_string());
        self.maybe_delay().await;
        lock(&self.exchange_result).clone()
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_refresh_token) = Some(refresh_token.to_string());
        self.maybe_delay().await;
        lock(&self.refresh_result).clone()
    }

    fn redirect_uri(&self) -> &str {
        "http://localhost:8888/callback"
    }
}

/// Mock store for testing failure paths
///
/// Delegates to a [`MemoryStore`] and can be switched to fail reads or
/// writes with [`StoreError::Unavailable`] at any point.
#[derive(Debug, Clone)]
pub struct MockStore<C: Clock + Clone = crate::time::SystemClock> {
    inner: MemoryStore<C>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MockStore {
    /// Create a mock store backed by a system-clock [`MemoryStore`].
    pub fn new() -> Self {
        Self::wrap(MemoryStore::new())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> MockStore<C> {
    /// Wrap an existing memory store.
    pub fn wrap(inner: MemoryStore<C>) -> Self {
        Self {
            inner,
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            reads: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make `get` and `take` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make `put`, `put_if_absent` and `delete` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of read operations attempted.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write operations attempted.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The wrapped memory store.
    #[must_use]
    pub fn inner(&self) -> &MemoryStore<C> {
        &self.inner
    }

    fn check_read(&self) -> StoreResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock read failure".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock + Clone> TimedStore for MockStore<C> {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        self.check_write()?;
        self.inner.put(key, value, ttl).await
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        self.check_write()?;
        self.inner.put_if_absent(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_read()?;
        self.inner.get(key).await
    }

    async fn take(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_read()?;
        self.inner.take(key).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.check_write()?;
        self.inner.delete(key).await
    }

    async fn ping(&self) -> StoreHealth {
        if self.fail_reads.load(Ordering::SeqCst) {
            return StoreHealth::Unhealthy("mock read failure".to_string());
        }
        self.inner.ping().await
    }

    async fn close(&self) -> StoreResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::mocks.
    use super::*;

    /// Validates `MockOAuthClient::new` behavior for the scripted exchange
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the default exchange succeeds and records the verifier.
    /// - Confirms a scripted error is returned afterwards.
    #[tokio::test]
    async fn test_mock_oauth_client_exchange() {
        let client = MockOAuthClient::new();

        let tokens = client.exchange_code("code", "verifier-1").await.expect("exchange");
        assert_eq!(tokens.access_token, "mock_access_token");
        assert_eq!(client.last_verifier().as_deref(), Some("verifier-1"));

        client.set_exchange_error(OAuthClientError::Remote { status: 403, body: String::new() });
        let err = client.exchange_code("code", "verifier-2").await.unwrap_err();
        assert!(matches!(err, OAuthClientError::Remote { status: 403, .. }));
        assert_eq!(client.exchange_calls(), 2);
    }

    /// Validates `MockOAuthClient::refresh` behavior for the mock oauth
    /// client refresh scenario.
    ///
    /// Assertions:
    /// - Confirms `tokens.access_token` equals `"refreshed_access_token"`.
    /// - Confirms the refresh token argument is recorded.
    #[tokio::test]
    async fn test_mock_oauth_client_refresh() {
        let client = MockOAuthClient::new();
        assert_eq!(client.refresh_calls(), 0);

        let tokens = client.refresh("rt").await.expect("refresh should succeed");
        assert_eq!(tokens.access_token, "refreshed_access_token");
        assert_eq!(client.refresh_calls(), 1);
        assert_eq!(client.last_refresh_token().as_deref(), Some("rt"));
    }

    /// Validates `MockStore::set_fail_reads` behavior for the failure
    /// injection scenario.
    ///
    /// Assertions:
    /// - Ensures reads fail with `Unavailable` while writes still succeed.
    /// - Ensures reads recover once the switch is cleared.
    #[tokio::test]
    async fn test_mock_store_failure_injection() {
        let store = MockStore::new();
        store.set_fail_reads(true);

        store.put("k", "v".to_string(), None).await.expect("write");
        assert!(matches!(store.get("k").await, Err(StoreError::Unavailable(_))));
        assert!(!store.ping().await.is_healthy());

        store.set_fail_reads(false);
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.reads(), 2);
        assert_eq!(store.writes(), 1);
    }
}
