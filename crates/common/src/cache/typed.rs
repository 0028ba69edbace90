//! JSON helpers over a shared [`TimedStore`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{StoreError, StoreHealth, StoreResult, TimedStore};

/// Typed facade over a `TimedStore`, encoding values as JSON.
///
/// Cheap to clone; every clone talks to the same backend.
#[derive(Clone)]
pub struct TypedStore {
    inner: Arc<dyn TimedStore>,
}

impl fmt::Debug for TypedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedStore").finish_non_exhaustive()
    }
}

impl TypedStore {
    /// Wrap a store backend.
    pub fn new(inner: Arc<dyn TimedStore>) -> Self {
        Self { inner }
    }

    /// Access the raw backend.
    pub fn inner(&self) -> &Arc<dyn TimedStore> {
        &self.inner
    }

    /// Serialize `value` and store it under `key`.
    pub async fn put_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.inner.put(key, encode(value)?, ttl).await
    }

    /// Serialize `value` and store it only if `key` is absent.
    pub async fn put_json_if_absent<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>
    where
        T: Serialize + ?Sized,
    {
        self.inner.put_if_absent(key, encode(value)?, ttl).await
    }

    /// Read and decode the value under `key`.
    pub async fn get_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.inner.get(key).await?.map(|raw| decode(&raw)).transpose()
    }

    /// Atomically read, delete and decode the value under `key`.
    pub async fn take_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.inner.take(key).await?.map(|raw| decode(&raw)).transpose()
    }

    /// Delete `key`.
    pub async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.inner.delete(key).await
    }

    /// Probe the backend.
    pub async fn ping(&self) -> StoreHealth {
        self.inner.ping().await
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}
