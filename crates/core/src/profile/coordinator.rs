//! Cache-aside profile retrieval
//!
//! `get_profile` reads `profile:<key>` first and falls back to the source on
//! a miss. Store failures on the read side degrade to a miss; store failures
//! on the write side are logged and the fetched profile is still returned.
//! Concurrent misses for one key each fetch; the last write wins with an
//! equivalent record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use profilelink_common::cache::{TimedStore, TypedStore};
use profilelink_common::time::{Clock, SystemClock};
use profilelink_domain::constants::{DEFAULT_HTTP_TIMEOUT_SECS, PROFILE_TTL_SECS};
use profilelink_domain::{Credential, ProfileLinkError, ProfileRecord, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::normalizer::ProfileNormalizer;
use crate::errors::IntoDomainError;
use crate::keys;
use crate::ports::ProfileSource;

/// Value stored under `profile:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProfile {
    pub value: ProfileRecord,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub stored_at: DateTime<Utc>,
}

/// Result of a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLookup {
    pub profile: ProfileRecord,
    /// Whether the profile was served without contacting the source.
    pub from_cache: bool,
    /// Last successful (re)computation; "now" when that stamp is missing.
    pub last_update: DateTime<Utc>,
}

/// Coordinates cache reads, source fetches and write-back.
pub struct ProfileCacheCoordinator {
    source: Arc<dyn ProfileSource>,
    store: TypedStore,
    normalizer: ProfileNormalizer,
    clock: Arc<dyn Clock>,
    profile_ttl: Duration,
    fetch_timeout: Duration,
}

impl ProfileCacheCoordinator {
    /// Create a coordinator with a 24h profile TTL and 30s fetch bound.
    pub fn new(source: Arc<dyn ProfileSource>, store: Arc<dyn TimedStore>) -> Self {
        Self {
            source,
            store: TypedStore::new(store),
            normalizer: ProfileNormalizer::new(),
            clock: Arc::new(SystemClock),
            profile_ttl: Duration::from_secs(PROFILE_TTL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_profile_ttl(mut self, ttl: Duration) -> Self {
        self.profile_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Serve `key` from cache, or fetch, normalize and cache it.
    ///
    /// # Errors
    /// `InvalidInput` for a blank key, `FetchFailed` / `Timeout` from the
    /// source and `EmptyProfile` from the validity gate. Nothing is cached
    /// on error.
    pub async fn get_profile(&self, key: &str, credential: &Credential) -> Result<ProfileLookup> {
        self.get_profile_with_cancel(key, credential, &CancellationToken::new()).await
    }

    /// [`get_profile`](Self::get_profile) that aborts when `cancel` fires.
    ///
    /// A cancelled lookup returns `Cancelled` and writes nothing.
    pub async fn get_profile_with_cancel(
        &self,
        key: &str,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<ProfileLookup> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ProfileLinkError::InvalidInput("profile key is empty".into()));
        }
        if cancel.is_cancelled() {
            return Err(ProfileLinkError::Cancelled);
        }

        if let Some(cached) = self.read_cached(key).await {
            let last_update = self.last_update(key).await.unwrap_or_else(|| self.clock.utc_now());
            debug!(key, "profile served from cache");
            return Ok(ProfileLookup { profile: cached.value, from_cache: true, last_update });
        }

        let started = Instant::now();
        let raw = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(key, "profile fetch cancelled");
                return Err(ProfileLinkError::Cancelled);
            }
            fetched = tokio::time::timeout(self.fetch_timeout, self.source.fetch(key, credential)) => {
                fetched.map_err(|_| ProfileLinkError::timeout("profile fetch", self.fetch_timeout))??
            }
        };

        let profile = self.normalizer.normalize(&raw).inspect_err(|err| {
            warn!(key, error = %err, "profile rejected by normalizer");
        })?;

        if cancel.is_cancelled() {
            return Err(ProfileLinkError::Cancelled);
        }

        let now = self.clock.utc_now();
        self.write_back(key, &profile, now).await;
        info!(
            key,
            experiences = profile.experiences.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "profile fetched"
        );

        Ok(ProfileLookup { profile, from_cache: false, last_update: now })
    }

    /// Drop the cached profile for `key`. `lastUpdate:<key>` is kept.
    ///
    /// # Errors
    /// `StoreUnavailable` on store failure.
    pub async fn evict(&self, key: &str) -> Result<bool> {
        self.store.delete(&keys::profile_key(key)).await.map_err(IntoDomainError::into_domain)
    }

    /// When `key` was last successfully computed, if known.
    pub async fn last_update(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.store.get_json::<DateTime<Utc>>(&keys::last_update_key(key)).await {
            Ok(stamp) => stamp,
            Err(err) => {
                warn!(key, error = %err, "lastUpdate read failed");
                None
            }
        }
    }

    async fn read_cached(&self, key: &str) -> Option<CachedProfile> {
        match self.store.get_json::<CachedProfile>(&keys::profile_key(key)).await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(key, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write_back(&self, key: &str, profile: &ProfileRecord, now: DateTime<Utc>) {
        let entry = CachedProfile { value: profile.clone(), stored_at: now };

        if let Err(err) =
            self.store.put_json(&keys::profile_key(key), &entry, Some(self.profile_ttl)).await
        {
            warn!(key, error = %err, "profile not cached");
            return;
        }
        if let Err(err) = self.store.put_json(&keys::last_update_key(key), &now, None).await {
            warn!(key, error = %err, "lastUpdate not stamped");
        }
    }
}
