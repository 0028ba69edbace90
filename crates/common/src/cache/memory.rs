//! In-process [`TimedStore`] backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::stats::{MetricsCollector, StoreStats};
use super::store::{StoreError, StoreHealth, StoreResult, TimedStore};
use crate::time::{Clock, SystemClock};

/// Internal storage entry with expiry metadata.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    inserted_at: Instant,
    ttl: Option<Duration>,
}

impl StoredValue {
    /// An entry is expired once its age reaches the TTL.
    fn is_expired(&self, now: Instant) -> bool {
        self.ttl.is_some_and(|ttl| now.duration_since(self.inserted_at) >= ttl)
    }
}

/// In-memory store with per-key TTL.
///
/// Every mutating operation holds the write lock for its whole read-modify
/// step, which makes `take` and `put_if_absent` linearizable per key.
/// Expired entries are dropped lazily on access or by
/// [`MemoryStore::purge_expired`].
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use profilelink_common::cache::{MemoryStore, TimedStore};
///
/// # async fn example() -> profilelink_common::cache::StoreResult<()> {
/// let store = MemoryStore::new();
/// store.put("oauth:state:abc", "verifier".into(), Some(Duration::from_secs(300))).await?;
/// assert_eq!(store.take("oauth:state:abc").await?, Some("verifier".into()));
/// assert_eq!(store.take("oauth:state:abc").await?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore<C = SystemClock>
where
    C: Clock + Clone,
{
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
    closed: Arc<AtomicBool>,
    metrics: MetricsCollector,
    clock: C,
}

impl MemoryStore<SystemClock> {
    /// Create an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> MemoryStore<C>
where
    C: Clock + Clone,
{
    /// Create an empty store driven by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Current statistics.
    ///
    /// Uses a non-blocking read; the size is reported as 0 if the map is
    /// locked at that moment.
    pub fn stats(&self) -> StoreStats {
        let size = self.entries.try_read().map(|map| map.len()).unwrap_or(0);
        self.metrics.snapshot(size)
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remaining TTL for `key`, if it is live and has one.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let map = self.entries.read().await;
        let entry = map.get(key).filter(|entry| !entry.is_expired(now))?;
        entry.ttl.map(|ttl| ttl.saturating_sub(now.duration_since(entry.inserted_at)))
    }

    /// Remove all expired entries and return how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut map = self.entries.write().await;
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired(now));
        let removed = before - map.len();
        for _ in 0..removed {
            self.metrics.record_expiration();
        }
        if removed > 0 {
            debug!(removed, "purged expired store entries");
        }
        removed
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    fn entry(&self, value: String, ttl: Option<Duration>) -> StoredValue {
        StoredValue { value, inserted_at: self.clock.now(), ttl }
    }
}

#[async_trait]
impl<C> TimedStore for MemoryStore<C>
where
    C: Clock + Clone,
{
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        self.ensure_open()?;
        let entry = self.entry(value, ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        self.metrics.record_write();
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        self.ensure_open()?;
        let now = self.clock.now();
        let mut map = self.entries.write().await;

        if let Some(existing) = map.get(key) {
            if !existing.is_expired(now) {
                return Ok(false);
            }
            self.metrics.record_expiration();
        }

        map.insert(key.to_string(), StoredValue { value, inserted_at: now, ttl });
        self.metrics.record_write();
        Ok(true)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_open()?;
        let now = self.clock.now();

        {
            let map = self.entries.read().await;
            match map.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    self.metrics.record_hit();
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    self.metrics.record_miss();
                    return Ok(None);
                }
            }
        }

        // Expired: drop it unless a writer replaced it in between.
        let mut map = self.entries.write().await;
        if map.get(key).is_some_and(|entry| entry.is_expired(now)) {
            map.remove(key);
            self.metrics.record_expiration();
        }
        self.metrics.record_miss();
        Ok(None)
    }

    async fn take(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_open()?;
        let now = self.clock.now();
        let mut map = self.entries.write().await;

        match map.remove(key) {
            Some(entry) if entry.is_expired(now) => {
                self.metrics.record_expiration();
                self.metrics.record_miss();
                Ok(None)
            }
            Some(entry) => {
                self.metrics.record_take();
                Ok(Some(entry.value))
            }
            None => {
                self.metrics.record_miss();
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn ping(&self) -> StoreHealth {
        if self.closed.load(Ordering::Acquire) {
            StoreHealth::Unhealthy("store closed".to_string())
        } else {
            StoreHealth::Healthy
        }
    }

    async fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.entries.write().await.clear();
            debug!("memory store closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::memory.
    use std::sync::Arc;

    use super::*;
    use crate::time::MockClock;

    const STATE_TTL: Duration = Duration::from_secs(300);

    /// Validates `MemoryStore::put` behavior for the basic put and get
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms a stored value reads back unchanged.
    /// - Confirms an unknown key reads as `None`.
    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store.put("profile:ana", "{}".to_string(), None).await.unwrap();

        assert_eq!(store.get("profile:ana").await.unwrap(), Some("{}".to_string()));
        assert_eq!(store.get("profile:bob").await.unwrap(), None);
    }

    /// Validates `MemoryStore::with_clock` behavior for the ttl boundary
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the entry is live one millisecond before the TTL.
    /// - Confirms the entry reads as absent at exactly the TTL.
    #[tokio::test]
    async fn test_ttl_boundary_is_exclusive() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());
        store.put("oauth:state:s1", "v".to_string(), Some(STATE_TTL)).await.unwrap();

        clock.advance(STATE_TTL - Duration::from_millis(1));
        assert!(store.get("oauth:state:s1").await.unwrap().is_some());

        clock.advance_millis(1);
        assert_eq!(store.get("oauth:state:s1").await.unwrap(), None);
        assert_eq!(store.len().await, 0, "expired entry should be dropped on read");
    }

    /// Validates `MemoryStore::take` behavior for the single use scenario.
    ///
    /// Assertions:
    /// - Confirms the first take returns the value.
    /// - Confirms a second take returns `None`.
    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = MemoryStore::new();
        store.put("oauth:state:s1", "verifier".to_string(), Some(STATE_TTL)).await.unwrap();

        assert_eq!(store.take("oauth:state:s1").await.unwrap(), Some("verifier".to_string()));
        assert_eq!(store.take("oauth:state:s1").await.unwrap(), None);
    }

    /// Validates `MemoryStore::take` behavior for the expired take scenario.
    ///
    /// Assertions:
    /// - Confirms an expired entry cannot be taken.
    #[tokio::test]
    async fn test_take_expired_returns_none() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());
        store.put("oauth:state:s1", "verifier".to_string(), Some(STATE_TTL)).await.unwrap();

        clock.advance(Duration::from_secs(301));

        assert_eq!(store.take("oauth:state:s1").await.unwrap(), None);
        assert_eq!(store.stats().expirations, 1);
    }

    /// Validates `MemoryStore::take` behavior for the concurrent consumers
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms exactly one of many concurrent takers observes the value.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_take_has_single_winner() {
        let store = Arc::new(MemoryStore::new());
        store.put("oauth:state:race", "verifier".to_string(), None).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.take("oauth:state:race").await }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    /// Validates `MemoryStore::put_if_absent` behavior for the claim scenario.
    ///
    /// Assertions:
    /// - Confirms the first claim succeeds and the second fails.
    /// - Confirms the claim is available again once the first expires.
    #[tokio::test]
    async fn test_put_if_absent_claims_once() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());
        let ttl = Some(Duration::from_secs(10));

        assert!(store.put_if_absent("guard", "a".to_string(), ttl).await.unwrap());
        assert!(!store.put_if_absent("guard", "b".to_string(), ttl).await.unwrap());
        assert_eq!(store.get("guard").await.unwrap(), Some("a".to_string()));

        clock.advance(Duration::from_secs(10));
        assert!(store.put_if_absent("guard", "c".to_string(), ttl).await.unwrap());
        assert_eq!(store.get("guard").await.unwrap(), Some("c".to_string()));
    }

    /// Validates `MemoryStore::put` behavior for the overwrite resets ttl
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms a rewrite without TTL survives past the old TTL.
    #[tokio::test]
    async fn test_overwrite_replaces_ttl() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());

        store.put("lastUpdate:ana", "t1".to_string(), Some(Duration::from_secs(1))).await.unwrap();
        store.put("lastUpdate:ana", "t2".to_string(), None).await.unwrap();
        clock.advance(Duration::from_secs(3600));

        assert_eq!(store.get("lastUpdate:ana").await.unwrap(), Some("t2".to_string()));
        assert_eq!(store.ttl("lastUpdate:ana").await, None);
    }

    /// Validates `MemoryStore::ttl` behavior for the remaining ttl scenario.
    ///
    /// Assertions:
    /// - Confirms the remaining TTL shrinks as the clock advances.
    #[tokio::test]
    async fn test_remaining_ttl() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());
        store.put("k", "v".to_string(), Some(Duration::from_secs(60))).await.unwrap();

        clock.advance(Duration::from_secs(15));
        assert_eq!(store.ttl("k").await, Some(Duration::from_secs(45)));
    }

    /// Validates `MemoryStore::delete` behavior for the delete scenario.
    ///
    /// Assertions:
    /// - Confirms deleting a live key reports `true`, a missing key `false`.
    #[tokio::test]
    async fn test_delete_reports_removal() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), None).await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    /// Validates `MemoryStore::purge_expired` behavior for the purge scenario.
    ///
    /// Assertions:
    /// - Confirms only expired entries are removed.
    #[tokio::test]
    async fn test_purge_expired() {
        let clock = MockClock::new();
        let store = MemoryStore::with_clock(clock.clone());
        store.put("short", "1".to_string(), Some(Duration::from_secs(1))).await.unwrap();
        store.put("long", "2".to_string(), Some(Duration::from_secs(100))).await.unwrap();
        store.put("forever", "3".to_string(), None).await.unwrap();

        clock.advance(Duration::from_secs(5));

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 2);
    }

    /// Validates `MemoryStore::close` behavior for the closed store scenario.
    ///
    /// Assertions:
    /// - Confirms operations after close fail with `StoreError::Closed`.
    /// - Confirms the health probe reports unhealthy.
    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), None).await.unwrap();
        assert!(store.ping().await.is_healthy());

        store.close().await.unwrap();

        assert_eq!(store.get("k").await, Err(StoreError::Closed));
        assert_eq!(store.take("k").await, Err(StoreError::Closed));
        assert_eq!(store.put("k", "v".to_string(), None).await, Err(StoreError::Closed));
        assert!(!store.ping().await.is_healthy());
        // closing twice is harmless
        assert!(store.close().await.is_ok());
    }

    /// Validates `MemoryStore::stats` behavior for the hit and miss counting
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms hits, misses and takes are counted.
    #[tokio::test]
    async fn test_stats_tracking() {
        let store = MemoryStore::new();
        store.put("k", "v".to_string(), None).await.unwrap();
        store.get("k").await.unwrap();
        store.get("missing").await.unwrap();
        store.take("k").await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.takes, 1);
        assert_eq!(stats.writes, 1);
    }
}
