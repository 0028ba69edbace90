use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Errors raised by [`TimedStore`] backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the command.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store has been closed and no longer accepts operations.
    #[error("store closed")]
    Closed,

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ErrorClassification for StoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unavailable(_) | Self::Closed => ErrorSeverity::Error,
            Self::Serialization(_) => ErrorSeverity::Warning,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a store health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreHealth {
    /// The backend answered the probe.
    Healthy,
    /// The backend did not answer; carries the reason.
    Unhealthy(String),
}

impl StoreHealth {
    /// Whether the probe succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Key/value store with optional per-key TTL.
///
/// Values are opaque strings; see [`super::TypedStore`] for JSON helpers.
/// A `ttl` of `None` keeps the entry until it is deleted.
#[async_trait]
pub trait TimedStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and TTL.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()>;

    /// Store `value` only if `key` is absent or expired.
    ///
    /// Returns `true` when this call claimed the key.
    async fn put_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Read the value for `key`. Expired entries read as `None`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Atomically read and delete the value for `key`.
    ///
    /// At most one concurrent caller observes `Some` for a given write.
    async fn take(&self, key: &str) -> StoreResult<Option<String>>;

    /// Delete `key`. Returns `true` if a live entry was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Probe the backend.
    async fn ping(&self) -> StoreHealth;

    /// End the store lifecycle. Later operations fail with
    /// [`StoreError::Closed`].
    async fn close(&self) -> StoreResult<()>;
}
